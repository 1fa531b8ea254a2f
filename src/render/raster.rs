use crate::utils::error::{AssessmentError, Result};
use resvg::{tiny_skia, usvg};
use std::sync::{Arc, OnceLock};

static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// System fonts, loaded once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            db.set_sans_serif_family("DejaVu Sans");
            if db.is_empty() {
                tracing::warn!("⚠️ No system fonts found; chart text will be omitted from PNG output");
            } else {
                tracing::debug!("Loaded {} font faces", db.len());
            }
            Arc::new(db)
        })
        .clone()
}

/// Rasterizes an SVG document at its own pixel size.
pub fn svg_to_png(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb = font_database();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| AssessmentError::render(format!("invalid SVG document: {}", e)))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        AssessmentError::render(format!(
            "cannot allocate a {}x{} canvas",
            size.width(),
            size.height()
        ))
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| AssessmentError::render(format!("PNG encoding failed: {}", e)))
}
