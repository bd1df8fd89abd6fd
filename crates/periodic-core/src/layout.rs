//! Element placement for each visualization mode.
//!
//! Every function here is pure: the same atomic number and mode always give
//! the same position, so repopulating the scene never makes elements jitter.

use crate::element::Element;
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisualizationMode {
    #[default]
    Spiral,
    Table,
    Harmonic,
    Orbital,
}

impl VisualizationMode {
    pub const ALL: [VisualizationMode; 4] = [
        VisualizationMode::Spiral,
        VisualizationMode::Table,
        VisualizationMode::Harmonic,
        VisualizationMode::Orbital,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VisualizationMode::Spiral => "spiral",
            VisualizationMode::Table => "table",
            VisualizationMode::Harmonic => "harmonic",
            VisualizationMode::Orbital => "orbital",
        }
    }
}

impl FromStr for VisualizationMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spiral" => Ok(VisualizationMode::Spiral),
            "table" => Ok(VisualizationMode::Table),
            "harmonic" => Ok(VisualizationMode::Harmonic),
            "orbital" => Ok(VisualizationMode::Orbital),
            _ => Err(()),
        }
    }
}

// Fallback slot for records without group/period.
const DEFAULT_GROUP: u32 = 18;
const DEFAULT_PERIOD: u32 = 7;

/// `(group, period)` of an element in the standard 18-column table.
/// Lanthanides and actinides report group 3.
pub fn table_slot(atomic_number: u32) -> Option<(u32, u32)> {
    let n = atomic_number;
    let slot = match n {
        1 => (1, 1),
        2 => (18, 1),
        3..=4 => (n - 2, 2),
        5..=10 => (n + 8, 2),
        11..=12 => (n - 10, 3),
        13..=18 => (n, 3),
        19..=36 => (n - 18, 4),
        37..=54 => (n - 36, 5),
        55..=56 => (n - 54, 6),
        57..=71 => (3, 6),
        72..=86 => (n - 68, 6),
        87..=88 => (n - 86, 7),
        89..=103 => (3, 7),
        104..=118 => (n - 100, 7),
        _ => return None,
    };
    Some(slot)
}

/// Grid cell `(column, row)` used by the table layout. The f-block is pulled
/// out into rows 8 and 9.
pub fn table_cell(atomic_number: u32, group: u32, period: u32) -> (f32, f32) {
    match (period, group) {
        (6, 3) => (atomic_number as f32 - 56.0, 8.0),
        (7, 3) => (atomic_number as f32 - 88.0, 9.0),
        _ => (group as f32, period as f32),
    }
}

fn table_position(atomic_number: u32, group: u32, period: u32) -> Vec3 {
    let (column, row) = table_cell(atomic_number, group, period);
    Vec3::new(column * 2.0 - 18.0, 0.0, row * 2.0 - 7.0)
}

fn spiral_position(n: f32) -> Vec3 {
    let r = n.sqrt() * 1.5;
    let a = n * 0.6;
    Vec3::new(r * a.cos(), 0.0, r * a.sin())
}

fn harmonic_position(n: f32) -> Vec3 {
    let r = n.sqrt() * 1.8;
    let a = n * 0.17 * PI;
    Vec3::new(r * a.cos(), (n * 0.25).sin() * 5.0, r * a.sin())
}

/// Shells of size `s² - (s-1)²` on rings of radius `4s`; even shells bob.
fn orbital_position(atomic_number: u32) -> Vec3 {
    let n = atomic_number as f32;
    let shell = (atomic_number as f64).sqrt().ceil() as u32;
    let prev = (shell.saturating_sub(1) * shell.saturating_sub(1)) as f32;
    let in_shell = n - prev;
    let total = (shell * shell) as f32 - prev;
    let angle = if total > 0.0 {
        in_shell / total * TAU
    } else {
        0.0
    };
    let radius = shell as f32 * 4.0;
    let y = if shell % 2 == 0 {
        (n * 0.5).sin() * 2.0
    } else {
        0.0
    };
    Vec3::new(radius * angle.cos(), y, radius * angle.sin())
}

/// World position of an element in the given mode.
pub fn position_for(atomic_number: u32, mode: VisualizationMode) -> Vec3 {
    match mode {
        VisualizationMode::Table => {
            let (group, period) =
                table_slot(atomic_number).unwrap_or((DEFAULT_GROUP, DEFAULT_PERIOD));
            table_position(atomic_number, group, period)
        }
        VisualizationMode::Spiral => spiral_position(atomic_number as f32),
        VisualizationMode::Harmonic => harmonic_position(atomic_number as f32),
        VisualizationMode::Orbital => orbital_position(atomic_number),
    }
}

/// Like [`position_for`], but the table layout honours the record's own
/// group/period when the feed supplies them.
pub fn position_for_element(element: &Element, mode: VisualizationMode) -> Vec3 {
    if mode != VisualizationMode::Table {
        return position_for(element.atomic_number, mode);
    }
    let slot = table_slot(element.atomic_number);
    let group = element
        .group
        .or(slot.map(|s| s.0))
        .unwrap_or(DEFAULT_GROUP);
    let period = element
        .period
        .or(slot.map(|s| s.1))
        .unwrap_or(DEFAULT_PERIOD);
    table_position(element.atomic_number, group, period)
}

/// Position by mode name; an unrecognised mode places the element at the origin.
pub fn position_for_name(atomic_number: u32, mode: &str) -> Vec3 {
    match mode.parse::<VisualizationMode>() {
        Ok(m) => position_for(atomic_number, m),
        Err(()) => Vec3::ZERO,
    }
}
