//! Output artifacts derived from an [`AssessmentOutcome`]: score table,
//! JSON report and the ZIP bundle.

use crate::core::catalog::display_name;
use crate::domain::model::{
    AnswerRecord, AssessmentOutcome, MinimumStandardAnalysis, PillarScore, QuestionId,
    ThematicSummary,
};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SCORES_HEADER: [&str; 4] = ["Pillar", "Thematic Area", "Score", "Maturity"];

/// File names of every artifact, prefixed with the tool name. Whitespace and
/// path separators in the tool name become `_` so every name stays a single
/// file inside the output directory.
#[derive(Debug, Clone)]
pub struct OutputNames {
    tool: String,
}

impl OutputNames {
    pub fn new(tool_name: &str) -> Self {
        Self {
            tool: tool_name
                .trim()
                .replace(|c: char| c.is_whitespace() || c == '/' || c == '\\', "_"),
        }
    }

    pub fn petal_png(&self) -> String {
        format!("{}_Assessment_Result.png", self.tool)
    }

    pub fn petal_svg(&self) -> String {
        format!("{}_Assessment_Result.svg", self.tool)
    }

    pub fn progress_png(&self) -> String {
        format!("{}_Pillar_Progress.png", self.tool)
    }

    pub fn progress_svg(&self) -> String {
        format!("{}_Pillar_Progress.svg", self.tool)
    }

    pub fn scores_csv(&self) -> String {
        format!("{}_Scores.csv", self.tool)
    }

    pub fn report_json(&self) -> String {
        format!("{}_Report.json", self.tool)
    }

    pub fn bundle_zip(&self) -> String {
        format!("{}_Assessment_Result.zip", self.tool)
    }
}

/// `Pillar,Thematic Area,Score,Maturity`, one row per thematic area.
pub fn scores_csv(outcome: &AssessmentOutcome) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SCORES_HEADER)?;

    for score in &outcome.scores {
        let value = format!("{:.3}", score.score);
        writer.write_record([
            score.pillar.as_str(),
            score.thematic.as_str(),
            value.as_str(),
            score.maturity().label(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()).into())
}

#[derive(Serialize)]
struct ScoreEntry<'a> {
    pillar: &'a str,
    thematic: &'a str,
    display_name: String,
    score: f64,
    display_value: f64,
    maturity: &'static str,
    below_minimum: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    tool_name: &'a str,
    generated_at: DateTime<Utc>,
    country: Option<&'a str>,
    scores: Vec<ScoreEntry<'a>>,
    pillar_scores: &'a [PillarScore],
    minimum_standard: &'a MinimumStandardAnalysis,
    indicators: BTreeMap<&'a str, &'a str>,
    summaries: &'a [ThematicSummary],
    answers: &'a BTreeMap<QuestionId, AnswerRecord>,
    render_error: Option<&'a str>,
    petal_figure: Option<&'a serde_json::Value>,
}

pub fn report_json(outcome: &AssessmentOutcome, tool_name: &str) -> Result<Vec<u8>> {
    let report = Report {
        tool_name,
        generated_at: outcome.generated_at,
        country: outcome.country.as_deref(),
        scores: outcome
            .scores
            .iter()
            .map(|s| ScoreEntry {
                pillar: &s.pillar,
                thematic: &s.thematic,
                display_name: display_name(&s.thematic),
                score: s.score,
                display_value: s.display_value(),
                maturity: s.maturity().label(),
                below_minimum: s.below_minimum(),
            })
            .collect(),
        pillar_scores: &outcome.pillar_scores,
        minimum_standard: &outcome.analysis,
        indicators: outcome
            .summaries
            .iter()
            .map(|s| (s.thematic.as_str(), s.indicator.as_str()))
            .collect(),
        summaries: &outcome.summaries,
        answers: &outcome.answers,
        render_error: outcome.render_error.as_deref(),
        petal_figure: outcome.charts.as_ref().map(|c| &c.petal_figure),
    };

    Ok(serde_json::to_vec_pretty(&report)?)
}

/// Packs `(name, bytes)` pairs into an in-memory ZIP archive.
pub fn bundle_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
