use drm_petal::core::ConfigProvider;
use drm_petal::utils::validation::Validate;
use drm_petal::{
    AssessmentEngine, AssessmentError, AssessmentPipeline, LocalStorage, QuestionCatalog,
    RenderOptions, TomlConfig,
};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const ANSWERS: &str = "Q1,Yes,1;Q2,Yes,1;Q3,No,1;Q4,Unknown,1;Q5,Yes,0.5;Q12,Yes,1;Q20,Yes,1;Q38,Yes,1;Q45,Yes,1;Q46,No,1;";

fn toml_for(output: &Path, input: &str, extra: &str) -> String {
    format!(
        r#"
[assessment]
name = "integration"
tool_name = "DRM"
country = "Chile"

[input]
{input}

[output]
path = "{output}"
formats = ["png", "svg", "csv", "json", "zip"]

[render]
segments = 6
width = 400
height = 400
{extra}
"#,
        input = input,
        output = output.display().to_string().replace('\\', "/"),
        extra = extra
    )
}

async fn run(config: TomlConfig) -> drm_petal::Result<String> {
    config.validate()?;
    let catalog = config.catalog()?;
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AssessmentPipeline::new(storage, config, catalog);
    AssessmentEngine::new_with_monitoring(pipeline, true).run().await
}

#[tokio::test]
async fn test_end_to_end_writes_every_format() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out");
    let summaries = temp_dir.path().join("summaries");
    std::fs::create_dir_all(&summaries)?;
    std::fs::write(
        summaries.join("Resilient reconstruction.json"),
        r#"{"100": "{country} has a recovery framework but no dedicated financing."}"#,
    )?;

    let extra = format!(
        "\n[summaries]\ndir = \"{}\"\n",
        summaries.display().to_string().replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml_for(&output, &format!("data = \"{}\"", ANSWERS), &extra))?;

    let result = run(config).await?;
    assert_eq!(Path::new(&result), output.as_path());

    for name in [
        "DRM_Assessment_Result.png",
        "DRM_Assessment_Result.svg",
        "DRM_Pillar_Progress.png",
        "DRM_Pillar_Progress.svg",
        "DRM_Scores.csv",
        "DRM_Report.json",
        "DRM_Assessment_Result.zip",
    ] {
        assert!(output.join(name).exists(), "missing {}", name);
    }

    let png = std::fs::read(output.join("DRM_Assessment_Result.png"))?;
    assert_eq!(&png[1..4], b"PNG");

    let csv = std::fs::read_to_string(output.join("DRM_Scores.csv"))?;
    assert!(csv.starts_with("Pillar,Thematic Area,Score,Maturity"));
    assert_eq!(csv.lines().count(), 13);

    let report: serde_json::Value = serde_json::from_slice(&std::fs::read(output.join("DRM_Report.json"))?)?;
    assert_eq!(report["country"], "Chile");
    assert!(report["render_error"].is_null());
    let summary = report["summaries"]
        .as_array()
        .and_then(|s| s.last())
        .map(|s| s["summary"].as_str().unwrap_or_default().to_string())
        .unwrap_or_default();
    assert_eq!(summary, "Chile has a recovery framework but no dedicated financing.");
    assert_eq!(report["indicators"]["1.1. DRM policies and institutions"], "1100");

    let zip_file = std::fs::File::open(output.join("DRM_Assessment_Result.zip"))?;
    let mut archive = zip::ZipArchive::new(zip_file)?;
    assert_eq!(archive.len(), 6);
    let mut zipped_csv = String::new();
    archive.by_name("DRM_Scores.csv")?.read_to_string(&mut zipped_csv)?;
    assert_eq!(zipped_csv, csv);

    Ok(())
}

#[tokio::test]
async fn test_csv_input_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("answers.csv");
    std::fs::write(&input, "question,answer,weight\nQ1,Yes,1\nQ2,No,1\n\n")?;
    let output = temp_dir.path().join("out");

    let mut config = TomlConfig::from_toml_str(&toml_for(
        &output,
        &format!("path = \"{}\"", input.display().to_string().replace('\\', "/")),
        "",
    ))?;
    config.output.formats = vec!["csv".to_string()];

    run(config).await?;
    let csv = std::fs::read_to_string(output.join("DRM_Scores.csv"))?;
    let first_row = csv.lines().nth(1).unwrap_or_default();
    assert!(first_row.ends_with("0.500,Established"), "row: {}", first_row);
    assert!(!output.join("DRM_Report.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_csv_with_wrong_header_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("answers.csv");
    std::fs::write(&input, "Row,Column,Value\nQ1,Yes,1\n")?;
    let output = temp_dir.path().join("out");

    let config = TomlConfig::from_toml_str(&toml_for(
        &output,
        &format!("path = \"{}\"", input.display().to_string().replace('\\', "/")),
        "",
    ))?;

    let err = run(config).await.unwrap_err();
    assert!(matches!(err, AssessmentError::SchemaMismatch { .. }));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_invalid_answers_write_nothing() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("out");
    let config = TomlConfig::from_toml_str(&toml_for(&output, "data = \"Q1,Yes,1;Q2,Maybe,1\"", ""))?;

    let err = run(config).await.unwrap_err();
    assert!(matches!(err, AssessmentError::InvalidAnswer { .. }));
    assert!(err.user_friendly_message().contains("Q2"));
    assert!(!output.exists());
    Ok(())
}

struct ZeroSizeConfig {
    output: String,
    formats: Vec<String>,
}

impl ConfigProvider for ZeroSizeConfig {
    fn input_path(&self) -> Option<&str> {
        None
    }

    fn inline_data(&self) -> Option<&str> {
        Some("Q1,Yes,1")
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn tool_name(&self) -> &str {
        "DRM"
    }

    fn country(&self) -> Option<&str> {
        None
    }

    fn summaries_dir(&self) -> Option<&str> {
        None
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            petal_size: 0,
            ..RenderOptions::default()
        }
    }
}

#[tokio::test]
async fn test_render_failure_is_reported_not_fatal() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().to_str().unwrap_or_default().to_string();
    let config = ZeroSizeConfig {
        output: output.clone(),
        formats: vec!["png".to_string(), "csv".to_string(), "json".to_string()],
    };

    let pipeline = AssessmentPipeline::new(LocalStorage::new(output.clone()), config, QuestionCatalog::reference()?);
    AssessmentEngine::new(pipeline).run().await?;

    let out = Path::new(&output);
    assert!(!out.join("DRM_Assessment_Result.png").exists());
    assert!(out.join("DRM_Scores.csv").exists());

    let report: serde_json::Value = serde_json::from_slice(&std::fs::read(out.join("DRM_Report.json"))?)?;
    let message = report["render_error"].as_str().unwrap_or_default();
    assert!(message.starts_with("Error generating figure"), "message: {}", message);
    assert!(report["petal_figure"].is_null());
    Ok(())
}

#[test]
fn test_template_round_trips_through_parser() {
    let catalog = QuestionCatalog::reference().unwrap();
    let parsed = drm_petal::parse(&catalog.template(), &catalog).unwrap();
    assert_eq!(parsed.answers.len(), catalog.question_count());
    assert!(parsed.scores.iter().all(|s| s.score == 0.0));
}
