use clap::Parser;
use drm_petal::core::ConfigProvider;
use drm_petal::utils::error::AssessmentError;
use drm_petal::utils::{logger, validation::Validate};
use drm_petal::{AssessmentEngine, AssessmentPipeline, LocalStorage, QuestionCatalog, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-assess")]
#[command(about = "Runs a DRM assessment described by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "assessment.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the output formats from config
    #[arg(long, value_delimiter = ',')]
    formats: Option<Vec<String>>,

    /// Validate and summarize the configuration without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn report_failure(context: &str, e: &AssessmentError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based assessment");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(3);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(formats) = args.formats.clone() {
        tracing::info!("🔧 Output formats overridden to: {}", formats.join(", "));
        config.output.formats = formats;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        report_failure("Configuration validation failed", &e);
    }

    let catalog = match config.catalog() {
        Ok(catalog) => catalog,
        Err(e) => report_failure("Failed to load question catalog", &e),
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &catalog, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No outputs will be written");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AssessmentPipeline::new(storage, config, catalog);
    let engine = AssessmentEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Assessment completed successfully!");
            println!("✅ Assessment completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => report_failure("Assessment failed", &e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, catalog: &QuestionCatalog, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Assessment: {}", config.assessment.name);
    println!("  Tool: {}", config.tool_name());
    if let Some(country) = config.country() {
        println!("  Country: {}", country);
    }
    match (config.input_path(), config.inline_data()) {
        (Some(path), _) => println!("  Input: {}", path),
        (None, Some(data)) => println!("  Input: inline ({} bytes)", data.len()),
        (None, None) => println!("  Input: <none>"),
    }
    println!(
        "  Catalog: {} questions in {} areas across {} pillars",
        catalog.question_count(),
        catalog.areas().len(),
        catalog.pillar_count()
    );
    if let Some(dir) = config.summaries_dir() {
        println!("  Summaries: {}", dir);
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    let options = config.render_options();
    println!(
        "  Render: {} segments, gap ratio {}, petal {}px",
        options.segments, options.gap_ratio, options.petal_size
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
