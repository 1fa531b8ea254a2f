pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    catalog::QuestionCatalog, engine::AssessmentEngine, parser::parse, pipeline::AssessmentPipeline,
};
pub use render::{ChartRenderer, RenderOptions};
pub use utils::error::{AssessmentError, Result};
