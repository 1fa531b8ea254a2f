//! Horizontal bar chart of pillar achievement percentages.

use crate::core::catalog::display_name;
use crate::domain::model::PillarScore;
use crate::render::colormap::{progress_color, Rgb};
use crate::render::figure::{wrap_words, Baseline, Element, Figure, Point, Stroke, TextAnchor, TextElement};
use crate::render::RenderOptions;
use crate::utils::error::{AssessmentError, Result};

const MARGIN_LEFT: f64 = 260.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 60.0;
const ROW_HEIGHT: f64 = 60.0;
const MIN_HEIGHT: f64 = 300.0;
const FONT_SIZE: f64 = 13.0;

pub fn progress_figure(pillars: &[PillarScore], options: &RenderOptions) -> Result<Figure> {
    if pillars.is_empty() {
        return Err(AssessmentError::render("no pillar scores to chart"));
    }

    let width = options.progress_width as f64;
    let height = (pillars.len() as f64 * ROW_HEIGHT).max(MIN_HEIGHT);
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
    if plot_width <= 0.0 || plot_height <= 0.0 {
        return Err(AssessmentError::render(format!(
            "progress chart width {} leaves no room to plot",
            options.progress_width
        )));
    }

    let mut figure = Figure::new(width, height);
    let x_of = |percent: f64| MARGIN_LEFT + percent.clamp(0.0, 100.0) / 100.0 * plot_width;
    let bottom = MARGIN_TOP + plot_height;

    for tick in (0..=100).step_by(20) {
        let x = x_of(tick as f64);
        figure.push(Element::Line {
            from: Point::new(x, MARGIN_TOP),
            to: Point::new(x, bottom),
            stroke: Stroke::dashed(Rgb::LIGHT_GREY, 1.0, (3.0, 3.0)),
        });
        let mut label = TextElement::new(Point::new(x, bottom + 6.0), vec![format!("{}", tick)], FONT_SIZE);
        label.baseline = Baseline::Top;
        figure.push(Element::Text(label));
    }

    let mut axis_title = TextElement::new(
        Point::new(MARGIN_LEFT + plot_width / 2.0, height - 16.0),
        vec!["Achievement (%)".to_string()],
        FONT_SIZE,
    );
    axis_title.bold = true;
    figure.push(Element::Text(axis_title));

    let row = plot_height / pillars.len() as f64;
    let bar_height = row * 0.6;

    for (i, pillar) in pillars.iter().enumerate() {
        let center_y = MARGIN_TOP + row * (i as f64 + 0.5);
        let bar_end = x_of(pillar.percent);

        figure.push(Element::Rect {
            origin: Point::new(MARGIN_LEFT, center_y - bar_height / 2.0),
            width: bar_end - MARGIN_LEFT,
            height: bar_height,
            fill: Some(progress_color(pillar.maturity())),
            stroke: None,
        });

        let mut name = TextElement::new(
            Point::new(MARGIN_LEFT - 10.0, center_y),
            wrap_words(&display_name(&pillar.pillar), 32),
            FONT_SIZE,
        );
        name.anchor = TextAnchor::End;
        figure.push(Element::Text(name));

        let mut value = TextElement::new(
            Point::new(bar_end + 6.0, center_y),
            vec![format!("{:.0}%", pillar.percent)],
            FONT_SIZE,
        );
        value.anchor = TextAnchor::Start;
        value.bold = true;
        figure.push(Element::Text(value));
    }

    figure.push(Element::Line {
        from: Point::new(MARGIN_LEFT, MARGIN_TOP),
        to: Point::new(MARGIN_LEFT, bottom),
        stroke: Stroke::solid(Rgb::BLACK, 1.0),
    });

    Ok(figure)
}
