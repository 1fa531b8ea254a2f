use crate::core::ConfigProvider;
use crate::render::{RenderOptions, DEFAULT_SEGMENTS};
use crate::utils::error::{AssessmentError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "drm-petal")]
#[command(about = "Scores a disaster risk management assessment and draws its petal chart")]
pub struct CliConfig {
    /// Answers file: `Q1,Yes,1;...` text, or CSV with a Question,Answer,Weight header
    #[arg(long, conflicts_with = "data")]
    pub input: Option<String>,

    /// Answers given directly, e.g. "Q1,Yes,1;Q2,No,0.5"
    #[arg(long)]
    pub data: Option<String>,

    /// TOML file with [[areas]] entries; defaults to the built-in catalog
    #[arg(long)]
    pub catalog: Option<String>,

    /// Directory of per-area summary JSON files
    #[arg(long)]
    pub summaries_dir: Option<String>,

    #[arg(long)]
    pub country: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "png,csv,json")]
    pub formats: Vec<String>,

    #[arg(long, default_value = "DRM")]
    pub tool_name: String,

    /// Gradient segments per bar
    #[arg(long, default_value_t = DEFAULT_SEGMENTS)]
    pub segments: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase timing and memory")]
    pub monitor: bool,

    #[arg(long, help = "Print an answer template for the catalog and exit")]
    pub print_template: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> Option<&str> {
        self.input.as_deref()
    }

    fn inline_data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn tool_name(&self) -> &str {
        &self.tool_name
    }

    fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    fn summaries_dir(&self) -> Option<&str> {
        self.summaries_dir.as_deref()
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            segments: self.segments,
            ..RenderOptions::default()
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.print_template {
            return Ok(());
        }

        match (&self.input, &self.data) {
            (Some(_), Some(_)) => {
                return Err(AssessmentError::InvalidConfigValue {
                    field: "input".to_string(),
                    value: "--input + --data".to_string(),
                    reason: "Give either --input or --data, not both".to_string(),
                })
            }
            (None, Some(data)) => validation::validate_non_empty_string("data", data)?,
            _ => {
                let path = validation::validate_required_field("--input or --data", &self.input)?;
                validation::validate_path("input", path)?;
            }
        }

        if let Some(catalog) = &self.catalog {
            validation::validate_file_extension("catalog", catalog, &["toml"])?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_formats("formats", &self.formats)?;
        validation::validate_non_empty_string("tool_name", &self.tool_name)?;
        validation::validate_positive_number("segments", self.segments, 1)?;
        Ok(())
    }
}
