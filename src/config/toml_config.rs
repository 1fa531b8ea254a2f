use crate::core::catalog::{AreaDefinition, QuestionCatalog};
use crate::core::layout::DEFAULT_GAP_RATIO;
use crate::core::ConfigProvider;
use crate::render::{RenderOptions, DEFAULT_PETAL_SIZE, DEFAULT_SEGMENTS};
use crate::utils::error::{AssessmentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest accepted chart edge, in pixels.
pub const MIN_IMAGE_SIZE: u32 = 200;
pub const MAX_GAP_RATIO: f64 = 4.0;
/// Room for pillar names plus a usable plot area.
const MIN_PROGRESS_WIDTH: u32 = 480;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub assessment: AssessmentSection,
    pub input: InputSection,
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub render: RenderSection,
    pub output: OutputSection,
    pub summaries: Option<SummariesSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSection {
    pub name: String,
    #[serde(default = "default_tool_name")]
    pub tool_name: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub path: Option<String>,
    /// Pasted `Q1,Yes,1;...` answers.
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    /// External `[[areas]]` file.
    pub file: Option<String>,
    #[serde(default)]
    pub areas: Vec<AreaDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub segments: usize,
    pub gap_ratio: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            gap_ratio: DEFAULT_GAP_RATIO,
            width: DEFAULT_PETAL_SIZE,
            height: DEFAULT_PETAL_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummariesSection {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

fn default_tool_name() -> String {
    "DRM".to_string()
}

fn default_formats() -> Vec<String> {
    vec!["png".to_string(), "csv".to_string(), "json".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| {
            AssessmentError::configuration(format!("TOML parsing error: {}", e))
        })
    }

    /// 替換環境變數 (例如 ${COUNTRY})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| AssessmentError::configuration(format!("env var pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("assessment.name", &self.assessment.name)?;
        validation::validate_non_empty_string("assessment.tool_name", &self.assessment.tool_name)?;

        match (&self.input.path, &self.input.data) {
            (Some(_), Some(_)) => {
                return Err(AssessmentError::InvalidConfigValue {
                    field: "input".to_string(),
                    value: "path + data".to_string(),
                    reason: "Set either input.path or input.data, not both".to_string(),
                })
            }
            (None, Some(data)) => validation::validate_non_empty_string("input.data", data)?,
            _ => {
                let path = validation::validate_required_field("input.path or input.data", &self.input.path)?;
                validation::validate_path("input.path", path)?;
            }
        }

        if let Some(file) = &self.catalog.file {
            validation::validate_path("catalog.file", file)?;
            if !self.catalog.areas.is_empty() {
                return Err(AssessmentError::InvalidConfigValue {
                    field: "catalog".to_string(),
                    value: file.clone(),
                    reason: "Use either catalog.file or [[catalog.areas]], not both".to_string(),
                });
            }
        }

        validation::validate_positive_number("render.segments", self.render.segments, 1)?;
        validation::validate_range("render.gap_ratio", self.render.gap_ratio, 0.0, MAX_GAP_RATIO)?;
        validation::validate_positive_number("render.width", self.render.width as usize, MIN_IMAGE_SIZE as usize)?;
        validation::validate_positive_number("render.height", self.render.height as usize, MIN_IMAGE_SIZE as usize)?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_formats("output.formats", &self.output.formats)?;

        if let Some(summaries) = &self.summaries {
            validation::validate_path("summaries.dir", &summaries.dir)?;
        }

        Ok(())
    }

    /// Inline `[[catalog.areas]]`, then `catalog.file`, then the reference catalog.
    pub fn catalog(&self) -> Result<QuestionCatalog> {
        if !self.catalog.areas.is_empty() {
            tracing::info!("📚 Using {} catalog areas from the config file", self.catalog.areas.len());
            return QuestionCatalog::from_definitions(&self.catalog.areas);
        }
        QuestionCatalog::load(self.catalog.file.as_deref())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> Option<&str> {
        self.input.path.as_deref()
    }

    fn inline_data(&self) -> Option<&str> {
        self.input.data.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn tool_name(&self) -> &str {
        &self.assessment.tool_name
    }

    fn country(&self) -> Option<&str> {
        self.assessment.country.as_deref()
    }

    fn summaries_dir(&self) -> Option<&str> {
        self.summaries.as_ref().map(|s| s.dir.as_str())
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            segments: self.render.segments,
            gap_ratio: self.render.gap_ratio,
            // 花瓣圖為正方形，取較小邊
            petal_size: self.render.width.min(self.render.height),
            progress_width: (self.render.width * 4 / 5).max(MIN_PROGRESS_WIDTH),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[assessment]
name = "Chile 2026"
country = "Chile"

[input]
data = "Q1,Yes,1;Q2,No,1"

[output]
path = "./test-output"
formats = ["png", "csv"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.assessment.name, "Chile 2026");
        assert_eq!(config.tool_name(), "DRM");
        assert_eq!(config.country(), Some("Chile"));
        assert_eq!(config.inline_data(), Some("Q1,Yes,1;Q2,No,1"));
        assert_eq!(config.render_options(), RenderOptions::default());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DRM_PETAL_TEST_COUNTRY", "Peru");

        let toml_content = r#"
[assessment]
name = "test"
country = "${DRM_PETAL_TEST_COUNTRY}"
tool_name = "${DRM_PETAL_TEST_UNSET}"

[input]
path = "answers.txt"

[output]
path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.country(), Some("Peru"));
        assert_eq!(config.tool_name(), "${DRM_PETAL_TEST_UNSET}");
        assert_eq!(config.output_formats(), ["png", "csv", "json"]);

        std::env::remove_var("DRM_PETAL_TEST_COUNTRY");
    }

    #[test]
    fn test_render_section_validation() {
        let with_render = |render: &str| {
            TomlConfig::from_toml_str(&format!("{}\n[render]\n{}\n", BASIC, render)).unwrap()
        };

        assert!(with_render("segments = 50\ngap_ratio = 1.0").validate().is_ok());
        assert!(with_render("segments = 0").validate().is_err());
        assert!(with_render("gap_ratio = 4.5").validate().is_err());
        assert!(with_render("gap_ratio = -0.1").validate().is_err());
        assert!(with_render("width = 150").validate().is_err());

        let options = with_render("width = 1200\nheight = 900").render_options();
        assert_eq!(options.petal_size, 900);
        assert_eq!(options.progress_width, 960);
    }

    #[test]
    fn test_input_must_be_exactly_one() {
        let both = BASIC.replace("[input]\n", "[input]\npath = \"a.txt\"\n");
        let err = TomlConfig::from_toml_str(&both).unwrap().validate().unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidConfigValue { .. }));

        let neither = BASIC.replace("data = \"Q1,Yes,1;Q2,No,1\"\n", "");
        let err = TomlConfig::from_toml_str(&neither).unwrap().validate().unwrap_err();
        assert!(matches!(err, AssessmentError::MissingConfig { ref field } if field == "input.path or input.data"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        let config = TomlConfig::from_toml_str(&BASIC.replace("\"png\", \"csv\"", "\"pdf\"")).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inline_catalog() {
        let toml_content = format!(
            "{}\n{}",
            BASIC,
            r#"
[[catalog.areas]]
pillar = "1. Governance"
thematic = "1.1. Laws"
questions = "Q1-Q2"

[[catalog.areas]]
pillar = "2. Finance"
thematic = "2.1. Budgets"
questions = "Q3"
"#
        );
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.areas().len(), 2);
        assert_eq!(catalog.pillar_count(), 2);
        assert_eq!(catalog.question_count(), 3);
    }

    #[test]
    fn test_default_catalog_is_reference() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        assert_eq!(config.catalog().unwrap().question_count(), 47);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.assessment.name, "Chile 2026");
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let err = TomlConfig::from_toml_str("[assessment").unwrap_err();
        assert!(matches!(err, AssessmentError::Configuration { .. }));
    }
}
