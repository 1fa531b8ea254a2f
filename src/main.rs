use clap::Parser;
use drm_petal::utils::error::AssessmentError;
use drm_petal::utils::{logger, validation::Validate};
use drm_petal::{AssessmentEngine, AssessmentPipeline, CliConfig, LocalStorage, QuestionCatalog};

fn fail(context: &str, e: &AssessmentError) -> ! {
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
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting drm-petal CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail("Configuration validation failed", &e);
    }

    let catalog = match QuestionCatalog::load(config.catalog.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => fail("Failed to load question catalog", &e),
    };

    if config.print_template {
        println!("{}", catalog.template());
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = AssessmentPipeline::new(storage, config, catalog);

    let engine = AssessmentEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Assessment completed successfully!");
            println!("✅ Assessment completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => fail("Assessment failed", &e),
    }

    Ok(())
}
