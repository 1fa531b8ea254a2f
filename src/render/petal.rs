//! Circular "petal" chart: one gradient bar per thematic area, grouped by pillar.

use crate::core::catalog::display_name;
use crate::core::layout::{
    group_title_radius, label_placement, radial_limit, PetalLayout, VerticalAnchor, RADIAL_FLOOR,
};
use crate::domain::model::{MaturityBand, ThematicScore, DISPLAY_SCALE_MAX};
use crate::render::colormap::{ring_color, viridis, Rgb};
use crate::render::figure::{wrap_words, Baseline, Element, Figure, Point, Stroke, TextAnchor, TextElement};
use crate::render::RenderOptions;
use crate::utils::error::{AssessmentError, Result};

const LABEL_WRAP: usize = 14;
const TITLE_WRAP: usize = 13;

/// Maps display-scale values onto pixel radii around the chart centre.
#[derive(Debug, Clone, Copy)]
struct RadialScale {
    center: Point,
    floor: f64,
    ceiling: f64,
    plot_radius: f64,
}

impl RadialScale {
    fn radius(&self, value: f64) -> f64 {
        (value - self.floor) / (self.ceiling - self.floor) * self.plot_radius
    }

    fn point(&self, angle: f64, value: f64) -> Point {
        Point::polar(self.center, angle, self.radius(value))
    }
}

pub fn petal_figure(scores: &[ThematicScore], layout: &PetalLayout, options: &RenderOptions) -> Result<Figure> {
    if scores.is_empty() || scores.len() != layout.bars.len() {
        return Err(AssessmentError::render(format!(
            "{} scores cannot be drawn on a layout with {} bars",
            scores.len(),
            layout.bars.len()
        )));
    }

    let size = options.petal_size as f64;
    let mut figure = Figure::new(size, size);
    let max_value = scores
        .iter()
        .map(ThematicScore::display_value)
        .fold(0.0_f64, f64::max);
    let scale = RadialScale {
        center: Point::new(size / 2.0, size / 2.0),
        floor: RADIAL_FLOOR,
        ceiling: radial_limit(max_value),
        plot_radius: size * 0.36,
    };
    let font = size / 100.0;

    draw_grid(&mut figure, &scale);
    draw_reference_rings(&mut figure, &scale);
    draw_bar_labels(&mut figure, &scale, scores, layout, font);
    draw_bars(&mut figure, &scale, scores, layout, options.segments.max(1));
    draw_separators(&mut figure, &scale, layout);
    draw_group_titles(&mut figure, &scale, scores, layout, font);
    draw_legend(&mut figure, size, font);

    Ok(figure)
}

fn draw_grid(figure: &mut Figure, scale: &RadialScale) {
    for tick in 0..=DISPLAY_SCALE_MAX as usize {
        figure.push(Element::Circle {
            center: scale.center,
            radius: scale.radius(tick as f64),
            stroke: Stroke::dashed(Rgb::GREY, 1.0, (4.0, 6.0)).with_opacity(0.2),
        });
    }
}

fn draw_reference_rings(figure: &mut Figure, scale: &RadialScale) {
    for band in MaturityBand::ALL {
        figure.push(Element::Circle {
            center: scale.center,
            radius: scale.radius(band.ring_value()),
            stroke: Stroke::dashed(ring_color(band), 1.0, (3.7, 1.6)).with_opacity(0.5),
        });
    }
}

fn draw_bars(figure: &mut Figure, scale: &RadialScale, scores: &[ThematicScore], layout: &PetalLayout, segments: usize) {
    for (bar, score) in layout.bars.iter().zip(scores) {
        let height = score.display_value();
        if height <= 0.0 {
            continue;
        }

        // 以絕對高度取色：不同高度的長條在相同半徑處顏色一致
        let step = height / segments as f64;
        for j in 0..segments {
            let center_value = (j as f64 + 0.5) * step;
            let color = viridis(center_value / DISPLAY_SCALE_MAX);
            figure.push(Element::Sector {
                center: scale.center,
                inner_radius: scale.radius(j as f64 * step),
                outer_radius: scale.radius((j + 1) as f64 * step),
                start_angle: bar.angle_start,
                end_angle: bar.angle_end(),
                fill: Some(color),
                stroke: Some(Stroke::solid(color, 0.5)),
            });
        }

        figure.push(Element::Sector {
            center: scale.center,
            inner_radius: scale.radius(0.0),
            outer_radius: scale.radius(height),
            start_angle: bar.angle_start,
            end_angle: bar.angle_end(),
            fill: None,
            stroke: Some(Stroke::solid(Rgb::WHITE, 0.5)),
        });
    }
}

fn draw_separators(figure: &mut Figure, scale: &RadialScale, layout: &PetalLayout) {
    for angle in layout.separator_angles() {
        figure.push(Element::Line {
            from: scale.point(angle, 0.0),
            to: scale.point(angle, scale.ceiling),
            stroke: Stroke::solid(Rgb::GREY, 1.0).with_opacity(0.2),
        });
    }
}

fn draw_bar_labels(figure: &mut Figure, scale: &RadialScale, scores: &[ThematicScore], layout: &PetalLayout, font: f64) {
    for (bar, score) in layout.bars.iter().zip(scores) {
        let lines = wrap_words(&display_name(&score.thematic), LABEL_WRAP);
        if lines.is_empty() {
            continue;
        }

        let placement = label_placement(bar, score.display_value());
        let mut text = TextElement::new(scale.point(placement.angle, placement.radius), lines, font * 1.1);
        text.bold = true;
        text.opacity = 0.7;
        text.color = if score.below_minimum() {
            Rgb::WARNING
        } else {
            Rgb::BLACK
        };
        // placement 以逆時針計算角度，SVG 為順時針
        text.rotation_deg = -placement.rotation_deg;
        text.baseline = match placement.anchor {
            VerticalAnchor::Bottom => Baseline::Bottom,
            VerticalAnchor::Top => Baseline::Top,
        };
        text.background = Some(Rgb::WHITE);
        figure.push(Element::Text(text));
    }
}

fn draw_group_titles(figure: &mut Figure, scale: &RadialScale, scores: &[ThematicScore], layout: &PetalLayout, font: f64) {
    for group in &layout.groups {
        let group_max = scores[group.first_bar..=group.last_bar]
            .iter()
            .map(ThematicScore::display_value)
            .fold(0.0_f64, f64::max);
        let position = scale.point(group.centroid(), group_title_radius(group_max));

        let mut text = TextElement::new(position, wrap_words(&display_name(&group.pillar), TITLE_WRAP), font * 1.3);
        text.bold = true;
        text.opacity = 0.9;
        figure.push(Element::Text(text));
    }
}

fn draw_legend(figure: &mut Figure, size: f64, font: f64) {
    let entry_height = font * 2.6;
    let width = font * 15.0;
    let height = entry_height * MaturityBand::ALL.len() as f64 + font * 2.0;
    let origin = Point::new(size - width - font * 2.0, font * 2.0);

    figure.push(Element::Rect {
        origin,
        width,
        height,
        fill: Some(Rgb::WHITE),
        stroke: Some(Stroke::solid(Rgb::LIGHT_GREY, 1.0)),
    });

    for (i, band) in MaturityBand::ALL.iter().enumerate() {
        let y = origin.y + font * 1.0 + entry_height * (i as f64 + 0.5);
        let x = origin.x + font * 1.2;
        figure.push(Element::Line {
            from: Point::new(x, y),
            to: Point::new(x + font * 3.0, y),
            stroke: Stroke::dashed(ring_color(*band), 1.5, (3.7, 1.6)).with_opacity(0.5),
        });

        let mut text = TextElement::new(Point::new(x + font * 4.0, y), vec![band.label().to_string()], font * 1.3);
        text.anchor = TextAnchor::Start;
        figure.push(Element::Text(text));
    }
}
