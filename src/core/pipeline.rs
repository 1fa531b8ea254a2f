use crate::core::aggregate::{minimum_standard_analysis, pillar_scores};
use crate::core::catalog::QuestionCatalog;
use crate::core::narrative::{build_summaries, SummaryLibrary, SummarySource};
use crate::core::parser::parse_submission;
use crate::core::report::{bundle_zip, report_json, scores_csv, OutputNames};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    AssessmentOutcome, ChartArtifacts, InputFormat, PillarScore, RawSubmission, ThematicScore,
};
use crate::render::ChartRenderer;
use crate::utils::error::{AssessmentError, Result};
use chrono::Utc;
use std::path::Path;

pub struct AssessmentPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    catalog: QuestionCatalog,
    summaries: Box<dyn SummarySource>,
    renderer: ChartRenderer,
}

impl<S: Storage, C: ConfigProvider> AssessmentPipeline<S, C> {
    pub fn new(storage: S, config: C, catalog: QuestionCatalog) -> Self {
        let summaries = SummaryLibrary::new(config.summaries_dir());
        let renderer = ChartRenderer::new(config.render_options());
        Self {
            storage,
            config,
            catalog,
            summaries: Box::new(summaries),
            renderer,
        }
    }

    /// Replaces the directory-backed summary library.
    pub fn with_summary_source(mut self, source: Box<dyn SummarySource>) -> Self {
        self.summaries = source;
        self
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    fn wants(&self, format: &str) -> bool {
        self.config
            .output_formats()
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    fn needs_charts(&self) -> bool {
        ["png", "svg", "json", "zip"].iter().any(|f| self.wants(f))
    }

    fn render_charts(&self, scores: &[ThematicScore], pillars: &[PillarScore]) -> Result<ChartArtifacts> {
        let layout = self.renderer.petal_layout(scores, self.catalog.pillar_count())?;
        self.renderer.render(scores, pillars, &layout)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AssessmentPipeline<S, C> {
    async fn extract(&self) -> Result<RawSubmission> {
        if let Some(data) = self.config.inline_data() {
            tracing::debug!("Using {} bytes of inline answers", data.len());
            return Ok(RawSubmission {
                text: data.to_string(),
                format: InputFormat::Delimited,
                source: "inline".to_string(),
            });
        }

        let path = self.config.input_path().ok_or_else(|| AssessmentError::MissingConfig {
            field: "input".to_string(),
        })?;

        tracing::debug!("Reading answers from: {}", path);
        let bytes = self.storage.read_file(path).await?;
        let text = String::from_utf8(bytes).map_err(|e| {
            AssessmentError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path, e),
            ))
        })?;

        let is_csv = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        Ok(RawSubmission {
            text,
            format: if is_csv {
                InputFormat::Csv
            } else {
                InputFormat::Delimited
            },
            source: path.to_string(),
        })
    }

    async fn transform(&self, submission: RawSubmission) -> Result<AssessmentOutcome> {
        let parsed = parse_submission(&submission, &self.catalog)?;
        tracing::info!(
            "📝 Parsed {} answers from {} into {} thematic scores",
            parsed.answers.len(),
            submission.source,
            parsed.scores.len()
        );

        let pillars = pillar_scores(&parsed.scores);
        let analysis = minimum_standard_analysis(&parsed.scores);
        tracing::info!("📏 {}", analysis.message);

        let summaries = build_summaries(
            &self.catalog,
            &parsed.answers,
            &parsed.scores,
            self.summaries.as_ref(),
            self.config.country(),
        );

        let (charts, render_error) = if self.needs_charts() {
            match self.render_charts(&parsed.scores, &pillars) {
                Ok(charts) => (Some(charts), None),
                Err(e) => {
                    tracing::warn!("⚠️ Chart rendering failed: {}", e);
                    (None, Some(e.user_friendly_message()))
                }
            }
        } else {
            (None, None)
        };

        Ok(AssessmentOutcome {
            generated_at: Utc::now(),
            country: self.config.country().map(str::to_string),
            scores: parsed.scores,
            answers: parsed.answers,
            pillar_scores: pillars,
            analysis,
            summaries,
            charts,
            render_error,
        })
    }

    async fn load(&self, outcome: AssessmentOutcome) -> Result<String> {
        let names = OutputNames::new(self.config.tool_name());
        let mut artifacts: Vec<(String, Vec<u8>)> = Vec::new();

        if let Some(charts) = &outcome.charts {
            artifacts.push((names.petal_png(), charts.petal_png.clone()));
            artifacts.push((names.progress_png(), charts.progress_png.clone()));
            artifacts.push((names.petal_svg(), charts.petal_svg.clone().into_bytes()));
            artifacts.push((names.progress_svg(), charts.progress_svg.clone().into_bytes()));
        }
        artifacts.push((names.scores_csv(), scores_csv(&outcome)?));
        artifacts.push((names.report_json(), report_json(&outcome, self.config.tool_name())?));

        let mut written = 0;
        for (name, data) in &artifacts {
            let extension = name.rsplit('.').next().unwrap_or_default();
            if !self.wants(extension) {
                continue;
            }
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
            written += 1;
        }

        if (self.wants("png") || self.wants("svg")) && outcome.charts.is_none() {
            tracing::warn!("⚠️ Charts were not rendered; skipping image outputs");
        }

        if self.wants("zip") {
            let zip_data = bundle_zip(&artifacts)?;
            tracing::debug!("Writing ZIP bundle ({} bytes) with {} files", zip_data.len(), artifacts.len());
            self.storage.write_file(&names.bundle_zip(), &zip_data).await?;
            written += 1;
        }

        tracing::info!("💾 Wrote {} output files", written);
        Ok(self.config.output_path().to_string())
    }
}
