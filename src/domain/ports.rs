use crate::domain::model::{AssessmentOutcome, RawSubmission};
use crate::render::RenderOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Input file, absolute or relative to the working directory.
    fn input_path(&self) -> Option<&str>;
    /// Pasted answers given directly; takes precedence over `input_path`.
    fn inline_data(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn tool_name(&self) -> &str;
    fn country(&self) -> Option<&str>;
    fn summaries_dir(&self) -> Option<&str>;
    fn render_options(&self) -> RenderOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawSubmission>;
    async fn transform(&self, submission: RawSubmission) -> Result<AssessmentOutcome>;
    async fn load(&self, outcome: AssessmentOutcome) -> Result<String>;
}
