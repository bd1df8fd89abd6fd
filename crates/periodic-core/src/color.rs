//! Element colors for each color scheme.

use crate::element::{category_key, Element, ElementState};
use std::fmt;
use std::str::FromStr;

/// 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const NEUTRAL_GRAY: Color = Color::rgb(0xbf, 0xbf, 0xbf);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Normalized RGBA with full opacity, for GPU upload.
    pub fn to_rgba(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }

    fn from_table(hex: &'static str) -> Self {
        Self::from_hex(hex).unwrap_or(Self::NEUTRAL_GRAY)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    #[default]
    Category,
    State,
    AtomicRadius,
    Frequency,
    Octave,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 5] = [
        ColorScheme::Category,
        ColorScheme::State,
        ColorScheme::AtomicRadius,
        ColorScheme::Frequency,
        ColorScheme::Octave,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Category => "category",
            ColorScheme::State => "state",
            ColorScheme::AtomicRadius => "atomic-radius",
            ColorScheme::Frequency => "frequency",
            ColorScheme::Octave => "octave",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ColorScheme::Category => ColorScheme::State,
            ColorScheme::State => ColorScheme::AtomicRadius,
            ColorScheme::AtomicRadius => ColorScheme::Frequency,
            ColorScheme::Frequency => ColorScheme::Octave,
            ColorScheme::Octave => ColorScheme::Category,
        }
    }
}

impl FromStr for ColorScheme {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(ColorScheme::Category),
            "state" => Ok(ColorScheme::State),
            "atomic-radius" => Ok(ColorScheme::AtomicRadius),
            "frequency" => Ok(ColorScheme::Frequency),
            "octave" => Ok(ColorScheme::Octave),
            _ => Err(()),
        }
    }
}

// Rainbow over the twelve pitch classes, C first.
const NOTE_COLORS: [&str; 12] = [
    "#ff0000", "#ff4e00", "#ff9900", "#ffe100", "#ccff00", "#66ff00", "#00ff66", "#00ffcc",
    "#00ccff", "#0066ff", "#4c00ff", "#9900ff",
];

const OCTAVE_COLORS: [&str; 8] = [
    "#ff0000", "#ff7700", "#ffff00", "#00ff00", "#0000ff", "#8a2be2", "#ff00ff", "#ffffff",
];

pub fn category_color(category: &str) -> Color {
    let hex = match category_key(category).as_str() {
        "noble gas" => "#5cb3cc",
        "nonmetal" => "#0096ff",
        "alkali metal" => "#ff4c4c",
        "alkaline earth metal" => "#ff9999",
        "metalloid" => "#bd93f9",
        "post transition metal" => "#8be9fd",
        "transition metal" => "#ffb86c",
        "lanthanoid" => "#50fa7b",
        "actinoid" => "#94e2d5",
        "halogen" => "#ff79c6",
        "metal" => "#f1fa8c",
        _ => return Color::NEUTRAL_GRAY,
    };
    Color::from_table(hex)
}

pub fn state_color(state: ElementState) -> Color {
    match state {
        ElementState::Gas => Color::rgb(0x63, 0xe2, 0xff),
        ElementState::Liquid => Color::rgb(0x64, 0x95, 0xed),
        ElementState::Solid => Color::rgb(0xff, 0xb8, 0x61),
        ElementState::Unknown => Color::NEUTRAL_GRAY,
    }
}

/// Blue (small) through green to red (large). Without a measured radius the
/// atomic mass stands in, scaled down by ten.
pub fn atomic_radius_color(element: &Element) -> Color {
    let radius = element
        .atomic_radius
        .unwrap_or(element.atomic_mass / 10.0);
    let t = if radius.is_finite() {
        ((radius - 30.0) / 200.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let to_u8 = |v: f64| (v * 255.0).floor().clamp(0.0, 255.0) as u8;
    Color::rgb(
        to_u8(t),
        to_u8(1.0 - (t - 0.5).abs() * 2.0),
        to_u8(1.0 - t),
    )
}

pub fn frequency_color(atomic_number: u32) -> Color {
    Color::from_table(NOTE_COLORS[(atomic_number % 12) as usize])
}

pub fn octave_color(atomic_number: u32) -> Color {
    Color::from_table(OCTAVE_COLORS[((atomic_number / 12) % 8) as usize])
}

/// Display color of an element under a color scheme.
pub fn color_for(element: &Element, scheme: ColorScheme) -> Color {
    match scheme {
        ColorScheme::Category => category_color(&element.category),
        ColorScheme::State => state_color(element.state),
        ColorScheme::AtomicRadius => atomic_radius_color(element),
        ColorScheme::Frequency => frequency_color(element.atomic_number),
        ColorScheme::Octave => octave_color(element.atomic_number),
    }
}

/// Color by scheme name; an unrecognised scheme yields neutral gray.
pub fn color_for_name(element: &Element, scheme: &str) -> Color {
    match scheme.parse::<ColorScheme>() {
        Ok(s) => color_for(element, s),
        Err(()) => Color::NEUTRAL_GRAY,
    }
}
