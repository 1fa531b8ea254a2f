//! Serializes a [`Figure`] into a standalone SVG document.

use crate::render::figure::{Baseline, Element, Figure, Point, Stroke, TextAnchor, TextElement};
use std::f64::consts::{PI, TAU};
use std::fmt::Write;

pub const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

pub fn to_svg(figure: &Figure) -> String {
    let mut out = String::with_capacity(64 * figure.elements.len() + 256);
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(figure.width),
        h = fmt_num(figure.height)
    );
    let _ = writeln!(
        out,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        fmt_num(figure.width),
        fmt_num(figure.height),
        figure.background
    );

    for element in &figure.elements {
        write_element(&mut out, element);
    }

    out.push_str("</svg>\n");
    out
}

fn write_element(out: &mut String, element: &Element) {
    match element {
        Element::Sector {
            center,
            inner_radius,
            outer_radius,
            start_angle,
            end_angle,
            fill,
            stroke,
        } => {
            let path = sector_path(*center, *inner_radius, *outer_radius, *start_angle, *end_angle);
            let fill = fill.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
            let _ = writeln!(
                out,
                r#"<path d="{}" fill="{}" fill-rule="evenodd"{}/>"#,
                path,
                fill,
                stroke_attrs(stroke.as_ref())
            );
        }
        Element::Circle { center, radius, stroke } => {
            let _ = writeln!(
                out,
                r#"<circle cx="{}" cy="{}" r="{}" fill="none"{}/>"#,
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(radius.max(0.0)),
                stroke_attrs(Some(stroke))
            );
        }
        Element::Line { from, to, stroke } => {
            let _ = writeln!(
                out,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                fmt_num(from.x),
                fmt_num(from.y),
                fmt_num(to.x),
                fmt_num(to.y),
                stroke_attrs(Some(stroke))
            );
        }
        Element::Rect {
            origin,
            width,
            height,
            fill,
            stroke,
        } => {
            let fill = fill.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string());
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
                fmt_num(origin.x),
                fmt_num(origin.y),
                fmt_num(*width),
                fmt_num(*height),
                fill,
                stroke_attrs(stroke.as_ref())
            );
        }
        Element::Text(text) => write_text(out, text),
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };

    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        stroke.color,
        fmt_num(stroke.width)
    );
    if stroke.opacity < 1.0 {
        let _ = write!(attrs, r#" stroke-opacity="{}""#, fmt_num(stroke.opacity));
    }
    if let Some((dash, gap)) = stroke.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{} {}""#, fmt_num(dash), fmt_num(gap));
    }
    attrs
}

/// Path of an annular sector. A span of a full turn or more becomes a ring;
/// a non-positive inner radius closes the wedge at the centre.
pub fn sector_path(center: Point, inner: f64, outer: f64, start: f64, end: f64) -> String {
    let outer = outer.max(0.0);
    let inner = inner.max(0.0);
    let span = end - start;

    if span >= TAU - 1e-9 {
        let mut d = circle_path(center, outer);
        if inner > 0.0 {
            d.push(' ');
            d.push_str(&circle_path(center, inner));
        }
        return d;
    }

    let large_arc = if span > PI { 1 } else { 0 };
    let outer_start = Point::polar(center, start, outer);
    let outer_end = Point::polar(center, end, outer);

    let mut d = format!(
        "M {} {} A {} {} 0 {} 1 {} {}",
        fmt_num(outer_start.x),
        fmt_num(outer_start.y),
        fmt_num(outer),
        fmt_num(outer),
        large_arc,
        fmt_num(outer_end.x),
        fmt_num(outer_end.y)
    );

    if inner <= 0.0 {
        let _ = write!(d, " L {} {} Z", fmt_num(center.x), fmt_num(center.y));
    } else {
        let inner_end = Point::polar(center, end, inner);
        let inner_start = Point::polar(center, start, inner);
        let _ = write!(
            d,
            " L {} {} A {} {} 0 {} 0 {} {} Z",
            fmt_num(inner_end.x),
            fmt_num(inner_end.y),
            fmt_num(inner),
            fmt_num(inner),
            large_arc,
            fmt_num(inner_start.x),
            fmt_num(inner_start.y)
        );
    }
    d
}

fn circle_path(center: Point, radius: f64) -> String {
    // 兩段半圓組成完整圓
    format!(
        "M {x} {top} A {r} {r} 0 1 1 {x} {bottom} A {r} {r} 0 1 1 {x} {top} Z",
        x = fmt_num(center.x),
        top = fmt_num(center.y - radius),
        bottom = fmt_num(center.y + radius),
        r = fmt_num(radius)
    )
}

fn write_text(out: &mut String, text: &TextElement) {
    if text.lines.is_empty() {
        return;
    }

    let fs = text.font_size;
    let lh = text.line_height();
    let n = text.lines.len() as f64;
    let (x, y) = (text.position.x, text.position.y);

    let first_baseline = match text.baseline {
        Baseline::Bottom => y - 0.25 * fs - (n - 1.0) * lh,
        Baseline::Top => y + 0.8 * fs,
        Baseline::Middle => y - (n - 1.0) * lh / 2.0 + 0.35 * fs,
    };

    let _ = writeln!(
        out,
        r#"<g transform="rotate({} {} {})">"#,
        fmt_num(text.rotation_deg),
        fmt_num(x),
        fmt_num(y)
    );

    if let Some(background) = text.background {
        let widest = text.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
        let width = widest * fs * 0.62 + fs * 0.4;
        let height = n * lh + fs * 0.2;
        let left = match text.anchor {
            TextAnchor::Start => x - fs * 0.2,
            TextAnchor::Middle => x - width / 2.0,
            TextAnchor::End => x - width + fs * 0.2,
        };
        let top = first_baseline - fs * 0.95;
        let _ = writeln!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" fill-opacity="0.7"/>"#,
            fmt_num(left),
            fmt_num(top),
            fmt_num(width),
            fmt_num(height),
            background
        );
    }

    let anchor = match text.anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    };
    let _ = write!(
        out,
        r#"<text font-family="{}" font-size="{}" fill="{}" text-anchor="{}""#,
        FONT_FAMILY,
        fmt_num(fs),
        text.color,
        anchor
    );
    if text.bold {
        out.push_str(r#" font-weight="bold""#);
    }
    if text.opacity < 1.0 {
        let _ = write!(out, r#" fill-opacity="{}""#, fmt_num(text.opacity));
    }
    out.push('>');

    for (i, line) in text.lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="{}" y="{}">{}</tspan>"#,
            fmt_num(x),
            fmt_num(first_baseline + i as f64 * lh),
            escape_xml(line)
        );
    }
    out.push_str("</text>\n</g>\n");
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}
