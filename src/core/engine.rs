use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

pub struct AssessmentEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> AssessmentEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub fn monitor(&self) -> &PhaseMonitor {
        &self.monitor
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting assessment");

        // Extract
        tracing::info!("📥 Reading answers...");
        let submission = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} bytes from {}", submission.text.len(), submission.source);
        self.monitor.mark("extract");

        // Transform
        tracing::info!("🔄 Scoring and rendering...");
        let outcome = self.pipeline.transform(submission).await?;
        tracing::info!(
            "🔄 Scored {} thematic areas across {} pillars",
            outcome.scores.len(),
            outcome.pillar_scores.len()
        );
        if let Some(reason) = &outcome.render_error {
            tracing::warn!("⚠️ {}", reason);
        }
        self.monitor.mark("transform");

        // Load
        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.mark("load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
