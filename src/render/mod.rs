//! Chart rendering: scene building, SVG serialization and rasterization.

pub mod colormap;
pub mod figure;
pub mod petal;
pub mod progress;
pub mod raster;
pub mod svg;

use crate::core::layout::{layout, PetalLayout, DEFAULT_GAP_RATIO};
use crate::domain::model::{ChartArtifacts, PillarScore, ThematicScore};
use crate::utils::error::{AssessmentError, Result};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};

pub const DEFAULT_SEGMENTS: usize = 200;
pub const DEFAULT_PETAL_SIZE: u32 = 1000;
pub const DEFAULT_PROGRESS_WIDTH: u32 = 800;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Gradient segments per bar.
    pub segments: usize,
    pub gap_ratio: f64,
    /// Petal chart edge length in pixels.
    pub petal_size: u32,
    pub progress_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            segments: DEFAULT_SEGMENTS,
            gap_ratio: DEFAULT_GAP_RATIO,
            petal_size: DEFAULT_PETAL_SIZE,
            progress_width: DEFAULT_PROGRESS_WIDTH,
        }
    }
}

pub struct ChartRenderer {
    options: RenderOptions,
}

impl ChartRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn petal_layout(&self, scores: &[ThematicScore], group_count: usize) -> Result<PetalLayout> {
        layout(scores, group_count, self.options.gap_ratio)
    }

    /// Builds both charts and rasterizes them.
    pub fn render(
        &self,
        scores: &[ThematicScore],
        pillars: &[PillarScore],
        layout: &PetalLayout,
    ) -> Result<ChartArtifacts> {
        let petal = petal::petal_figure(scores, layout, &self.options)?;
        let progress = progress::progress_figure(pillars, &self.options)?;

        let petal_svg = svg::to_svg(&petal);
        let progress_svg = svg::to_svg(&progress);

        let petal_png = rasterize(&petal_svg)?;
        let progress_png = rasterize(&progress_svg)?;
        tracing::debug!(
            "Rendered petal chart ({} bytes) and progress chart ({} bytes)",
            petal_png.len(),
            progress_png.len()
        );

        Ok(ChartArtifacts {
            petal_svg,
            petal_png,
            progress_svg,
            progress_png,
            petal_figure: serde_json::to_value(&petal)?,
        })
    }
}

/// Rasterizes, turning a panic inside the rasterizer into a render error.
fn rasterize(svg: &str) -> Result<Vec<u8>> {
    match catch_unwind(AssertUnwindSafe(|| raster::svg_to_png(svg))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AssessmentError::render(format!("rasterizer panicked: {}", reason)))
        }
    }
}
