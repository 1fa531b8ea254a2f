//! Backend-independent scene description. Chart builders emit a [`Figure`];
//! the SVG writer and the JSON export both consume it.

use crate::render::colormap::Rgb;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` pixels along `angle` (radians, clockwise from twelve o'clock).
    pub fn polar(center: Point, angle: f64, radius: f64) -> Self {
        Self {
            x: center.x + radius * angle.sin(),
            y: center.y - radius * angle.cos(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    pub opacity: f64,
    /// Dash and gap lengths.
    pub dash: Option<(f64, f64)>,
}

impl Stroke {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            opacity: 1.0,
            dash: None,
        }
    }

    pub fn dashed(color: Rgb, width: f64, dash: (f64, f64)) -> Self {
        Self {
            dash: Some(dash),
            ..Self::solid(color, width)
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextElement {
    pub position: Point,
    pub lines: Vec<String>,
    pub font_size: f64,
    pub bold: bool,
    pub color: Rgb,
    pub opacity: f64,
    /// Clockwise, in degrees, about `position`.
    pub rotation_deg: f64,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
    pub background: Option<Rgb>,
}

impl TextElement {
    pub fn new(position: Point, lines: Vec<String>, font_size: f64) -> Self {
        Self {
            position,
            lines,
            font_size,
            bold: false,
            color: Rgb::BLACK,
            opacity: 1.0,
            rotation_deg: 0.0,
            anchor: TextAnchor::Middle,
            baseline: Baseline::Middle,
            background: None,
        }
    }

    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Annular sector; angles in radians, clockwise from twelve o'clock.
    Sector {
        center: Point,
        inner_radius: f64,
        outer_radius: f64,
        start_angle: f64,
        end_angle: f64,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Circle {
        center: Point,
        radius: f64,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Text(TextElement),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
    pub background: Rgb,
    pub elements: Vec<Element>,
}

impl Figure {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Rgb::WHITE,
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// Greedy word wrap; a single word longer than `max_chars` keeps its own line.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
