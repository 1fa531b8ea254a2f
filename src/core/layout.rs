//! Angular layout of the petal chart.
//!
//! Angles are radians, clockwise from twelve o'clock. `n` bars and `g` group
//! gaps share one full turn: `bar_width = TAU / (n + g * gap_ratio)`. A gap is
//! emitted after every group, the last one included, so bars plus gaps always
//! sum to exactly one revolution.

use crate::domain::model::{BarGeometry, ThematicScore, DISPLAY_SCALE_MAX};
use crate::utils::error::{AssessmentError, Result};
use serde::Serialize;

pub const FULL_TURN: f64 = std::f64::consts::TAU;

/// Each gap is half a bar wide.
pub const DEFAULT_GAP_RATIO: f64 = 0.5;

/// Inner bound of the radial axis; keeps an empty hub in the middle.
pub const RADIAL_FLOOR: f64 = -0.5;

/// Bar labels never sit closer to the centre than this display value.
pub const LABEL_MIN_RADIUS: f64 = 2.0;

/// Extra radial offset for labels flipped onto the lower half.
pub const FLIPPED_LABEL_OFFSET: f64 = 0.1;

pub const GROUP_TITLE_RADIUS: f64 = 4.7;
pub const GROUP_TITLE_RADIUS_FULL: f64 = 5.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSpan {
    pub group_id: usize,
    pub pillar: String,
    pub first_bar: usize,
    pub last_bar: usize,
    pub angle_start: f64,
    pub angle_end: f64,
    /// Middle of the gap that follows this group.
    pub separator_angle: f64,
}

impl GroupSpan {
    /// Where the pillar title goes.
    pub fn centroid(&self) -> f64 {
        (self.angle_start + self.angle_end) / 2.0
    }

    pub fn bar_count(&self) -> usize {
        self.last_bar - self.first_bar + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetalLayout {
    pub bars: Vec<BarGeometry>,
    pub groups: Vec<GroupSpan>,
    pub bar_width: f64,
    pub gap_width: f64,
}

impl PetalLayout {
    /// Sum of every bar width and every gap width.
    pub fn total_angle(&self) -> f64 {
        let bars: f64 = self.bars.iter().map(|b| b.width).sum();
        bars + self.groups.len() as f64 * self.gap_width
    }

    pub fn separator_angles(&self) -> Vec<f64> {
        self.groups.iter().map(|g| g.separator_angle).collect()
    }

    pub fn group_of(&self, bar: &BarGeometry) -> Option<&GroupSpan> {
        self.groups.get(bar.group_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerticalAnchor {
    /// Text sits on the anchor, growing away from the centre.
    Bottom,
    /// Text hangs from the anchor; used for flipped labels.
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPlacement {
    pub angle: f64,
    /// On the display scale (`0..=4`).
    pub radius: f64,
    /// Counter-clockwise text rotation in degrees.
    pub rotation_deg: f64,
    pub flipped: bool,
    pub anchor: VerticalAnchor,
}

fn count_groups(scores: &[ThematicScore]) -> usize {
    if scores.is_empty() {
        return 0;
    }
    1 + scores
        .windows(2)
        .filter(|pair| pair[0].pillar != pair[1].pillar)
        .count()
}

/// Lays out one bar per score, walking the scores in order and opening a new
/// group whenever the pillar changes.
pub fn layout(scores: &[ThematicScore], group_count: usize, gap_ratio: f64) -> Result<PetalLayout> {
    if scores.is_empty() {
        return Err(AssessmentError::render("no thematic areas to lay out"));
    }
    if !gap_ratio.is_finite() || gap_ratio < 0.0 {
        return Err(AssessmentError::render(format!(
            "gap ratio must be a non-negative number, got {}",
            gap_ratio
        )));
    }

    let observed = count_groups(scores);
    if group_count != observed {
        return Err(AssessmentError::render(format!(
            "expected {} pillar groups but the scores contain {}",
            group_count, observed
        )));
    }

    let n = scores.len() as f64;
    let bar_width = FULL_TURN / (n + group_count as f64 * gap_ratio);
    let gap_width = gap_ratio * bar_width;

    let mut bars = Vec::with_capacity(scores.len());
    let mut groups: Vec<GroupSpan> = Vec::with_capacity(group_count);
    let mut cursor = 0.0_f64;

    for (i, score) in scores.iter().enumerate() {
        let opens_group = groups
            .last()
            .map(|g| g.pillar != score.pillar)
            .unwrap_or(true);

        if opens_group {
            if let Some(open) = groups.last_mut() {
                open.angle_end = cursor;
                open.separator_angle = cursor + gap_width / 2.0;
                cursor += gap_width;
            }
            groups.push(GroupSpan {
                group_id: groups.len(),
                pillar: score.pillar.clone(),
                first_bar: i,
                last_bar: i,
                angle_start: cursor,
                angle_end: cursor,
                separator_angle: cursor,
            });
        }

        let group_id = groups.len() - 1;
        bars.push(BarGeometry {
            thematic_index: i,
            angle_start: cursor,
            width: bar_width,
            group_id,
        });
        groups[group_id].last_bar = i;
        cursor += bar_width;
    }

    // 最後一組後面同樣保留間隔
    if let Some(last) = groups.last_mut() {
        last.angle_end = cursor;
        last.separator_angle = cursor + gap_width / 2.0;
    }

    tracing::debug!(
        "Layout: {} bars in {} groups, bar width {:.4} rad, gap {:.4} rad",
        bars.len(),
        groups.len(),
        bar_width,
        gap_width
    );

    Ok(PetalLayout {
        bars,
        groups,
        bar_width,
        gap_width,
    })
}

/// Places a bar's name at `max(value, 2)`, rotated tangentially; labels that
/// would read upside-down (raw rotation strictly between -270° and -90°) are
/// turned by 180° and pushed out slightly.
pub fn label_placement(bar: &BarGeometry, display_value: f64) -> LabelPlacement {
    let angle = bar.angle_center();
    let mut radius = display_value.max(LABEL_MIN_RADIUS);
    let mut rotation_deg = -angle.to_degrees();
    let flipped = -270.0 < rotation_deg && rotation_deg < -90.0;

    if flipped {
        rotation_deg += 180.0;
        radius += FLIPPED_LABEL_OFFSET;
    }

    LabelPlacement {
        angle,
        radius,
        rotation_deg,
        flipped,
        anchor: if flipped {
            VerticalAnchor::Top
        } else {
            VerticalAnchor::Bottom
        },
    }
}

/// Outer edge of the radial axis for the tallest bar.
pub fn radial_limit(max_display_value: f64) -> f64 {
    (max_display_value * 1.2).max(DISPLAY_SCALE_MAX)
}

pub fn group_title_radius(group_max_display_value: f64) -> f64 {
    if group_max_display_value >= DISPLAY_SCALE_MAX {
        GROUP_TITLE_RADIUS_FULL
    } else {
        GROUP_TITLE_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(groups: &[usize]) -> Vec<ThematicScore> {
        groups
            .iter()
            .enumerate()
            .flat_map(|(g, &count)| {
                (0..count).map(move |i| ThematicScore {
                    pillar: format!("P{}", g),
                    thematic: format!("P{}-T{}", g, i),
                    score: 0.5,
                })
            })
            .collect()
    }

    fn bar_at(center_deg: f64) -> BarGeometry {
        let width = 0.1;
        BarGeometry {
            thematic_index: 0,
            angle_start: center_deg.to_radians() - width / 2.0,
            width,
            group_id: 0,
        }
    }

    #[test]
    fn test_full_turn_invariant() {
        for (groups, ratio) in [
            (vec![2, 1, 3, 3, 2, 1], 0.5),
            (vec![1], 0.5),
            (vec![5, 5], 0.0),
            (vec![1, 7, 2], 1.0),
            (vec![3, 3, 3, 3], 2.5),
        ] {
            let scores = scores(&groups);
            let layout = layout(&scores, groups.len(), ratio).unwrap();
            assert!(
                (layout.total_angle() - FULL_TURN).abs() < 1e-9,
                "groups {:?} ratio {}",
                groups,
                ratio
            );
            assert!((layout.groups.last().unwrap().angle_end + layout.gap_width - FULL_TURN).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reference_widths() {
        let layout = layout(&scores(&[2, 1, 3, 3, 2, 1]), 6, DEFAULT_GAP_RATIO).unwrap();
        let expected_bar = FULL_TURN / 15.0;
        assert!((layout.bar_width - expected_bar).abs() < 1e-12);
        assert!((layout.gap_width - expected_bar / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaps_open_at_pillar_changes() {
        let layout = layout(&scores(&[2, 1]), 2, 0.5).unwrap();
        let w = layout.bar_width;
        let gap = layout.gap_width;
        assert_eq!(layout.bars[0].angle_start, 0.0);
        assert!((layout.bars[1].angle_start - w).abs() < 1e-12);
        assert!((layout.bars[2].angle_start - (2.0 * w + gap)).abs() < 1e-12);
        assert_eq!(layout.bars[2].group_id, 1);
    }

    #[test]
    fn test_bars_do_not_overlap() {
        let layout = layout(&scores(&[2, 1, 3, 3, 2, 1]), 6, 0.5).unwrap();
        for pair in layout.bars.windows(2) {
            assert!(pair[1].angle_start >= pair[0].angle_end() - 1e-12);
        }
    }

    #[test]
    fn test_group_spans_and_separators() {
        let layout = layout(&scores(&[2, 3]), 2, 0.5).unwrap();
        let first = &layout.groups[0];
        assert_eq!((first.first_bar, first.last_bar), (0, 1));
        assert_eq!(first.bar_count(), 2);
        assert!((first.angle_end - layout.bars[1].angle_end()).abs() < 1e-12);
        assert!((first.separator_angle - (first.angle_end + layout.gap_width / 2.0)).abs() < 1e-12);
        assert!((first.centroid() - layout.bar_width).abs() < 1e-12);
        assert_eq!(layout.separator_angles().len(), 2);
    }

    #[test]
    fn test_layout_rejects_degenerate_input() {
        assert!(layout(&[], 0, 0.5).is_err());
        assert!(layout(&scores(&[2, 2]), 3, 0.5).is_err());
        assert!(layout(&scores(&[2, 2]), 2, -1.0).is_err());
        assert!(layout(&scores(&[2, 2]), 2, f64::NAN).is_err());
    }

    #[test]
    fn test_label_flip_threshold() {
        assert!(!label_placement(&bar_at(45.0), 3.0).flipped);
        assert!(!label_placement(&bar_at(89.9), 3.0).flipped);
        assert!(label_placement(&bar_at(90.1), 3.0).flipped);
        assert!(label_placement(&bar_at(180.0), 3.0).flipped);
        assert!(label_placement(&bar_at(269.9), 3.0).flipped);
        assert!(!label_placement(&bar_at(270.1), 3.0).flipped);
        assert!(!label_placement(&bar_at(330.0), 3.0).flipped);
    }

    #[test]
    fn test_flipped_label_geometry() {
        let label = label_placement(&bar_at(180.0), 3.0);
        assert!((label.rotation_deg - 0.0).abs() < 1e-9);
        assert!((label.radius - 3.1).abs() < 1e-9);
        assert_eq!(label.anchor, VerticalAnchor::Top);

        let label = label_placement(&bar_at(45.0), 0.4);
        assert!((label.rotation_deg + 45.0).abs() < 1e-9);
        assert_eq!(label.radius, LABEL_MIN_RADIUS);
        assert_eq!(label.anchor, VerticalAnchor::Bottom);
    }

    #[test]
    fn test_radial_limits() {
        assert_eq!(radial_limit(2.0), 4.0);
        assert!((radial_limit(4.0) - 4.8).abs() < 1e-12);
        assert_eq!(group_title_radius(3.9), GROUP_TITLE_RADIUS);
        assert_eq!(group_title_radius(4.0), GROUP_TITLE_RADIUS_FULL);
    }
}
