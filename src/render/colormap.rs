use crate::domain::model::MaturityBand;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GREY: Rgb = Rgb::new(128, 128, 128);
    pub const LIGHT_GREY: Rgb = Rgb::new(211, 211, 211);
    pub const WARNING: Rgb = Rgb::new(255, 0, 0);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Viridis sampled at 0.0, 0.1, ..., 1.0.
const VIRIDIS: [Rgb; 11] = [
    Rgb::new(68, 1, 84),
    Rgb::new(72, 36, 117),
    Rgb::new(65, 68, 135),
    Rgb::new(53, 95, 141),
    Rgb::new(42, 120, 142),
    Rgb::new(33, 145, 140),
    Rgb::new(34, 168, 132),
    Rgb::new(68, 191, 112),
    Rgb::new(122, 209, 81),
    Rgb::new(189, 223, 38),
    Rgb::new(253, 231, 37),
];

/// Continuous perceptual colormap; `t` is clamped to `0..=1`.
pub fn viridis(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let lower = scaled.floor() as usize;
    if lower >= VIRIDIS.len() - 1 {
        return VIRIDIS[VIRIDIS.len() - 1];
    }
    let frac = scaled - lower as f64;
    let (a, b) = (VIRIDIS[lower], VIRIDIS[lower + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Rgb::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

/// Dashed reference ring colour for each maturity band.
pub fn ring_color(band: MaturityBand) -> Rgb {
    match band {
        MaturityBand::Nascent => Rgb::new(255, 0, 0),
        MaturityBand::Emerging => Rgb::new(255, 165, 0),
        MaturityBand::Established => Rgb::new(0, 0, 255),
        MaturityBand::Mature => Rgb::new(0, 128, 0),
    }
}

/// Fill of a pillar progress bar: red, orange, yellow, blue.
pub fn progress_color(band: MaturityBand) -> Rgb {
    match band {
        MaturityBand::Nascent => Rgb::new(0xdc, 0x35, 0x45),
        MaturityBand::Emerging => Rgb::new(0xfd, 0x7e, 0x14),
        MaturityBand::Established => Rgb::new(0xff, 0xc1, 0x07),
        MaturityBand::Mature => Rgb::new(0x0d, 0x6e, 0xfd),
    }
}
