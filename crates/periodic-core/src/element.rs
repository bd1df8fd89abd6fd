//! Element records and the data feed that produces them.
//!
//! The feed is JSON first with a CSV fallback, mirroring how the browser front
//! end serves `/data/elements.json` and `/data/elements.csv`. A complete
//! dataset is embedded for offline use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::table_slot;

/// Embedded element dataset (all 118 elements).
pub const BUILTIN_ELEMENTS_JSON: &str = include_str!("../data/elements.json");

pub const MAX_ATOMIC_NUMBER: u32 = 118;

/// Element symbols indexed by `atomic_number - 1`.
pub const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Canonical spelling of a category for comparisons: lowercase, with `-` and
/// `_` read as spaces. Feeds disagree on `noble-gas` vs `noble gas`.
pub fn category_key(category: &str) -> String {
    category
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[inline]
pub fn symbol_for(atomic_number: u32) -> Option<&'static str> {
    let idx = atomic_number.checked_sub(1)? as usize;
    SYMBOLS.get(idx).copied()
}

#[derive(Error, Debug)]
pub enum ElementDataError {
    #[error("invalid element JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid element CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("atomic number {0} outside 1..=118")]
    AtomicNumberOutOfRange(u32),
    #[error("duplicate atomic number {0}")]
    DuplicateAtomicNumber(u32),
    #[error("element feed is empty")]
    Empty,
}

/// Physical state at room temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Solid,
    Liquid,
    Gas,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ElementState {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementState::Solid => "solid",
            ElementState::Liquid => "liquid",
            ElementState::Gas => "gas",
            ElementState::Unknown => "unknown",
        }
    }
}

/// One record of the element feed. Optional numeric fields stay `None` when
/// the feed omits them; they are never defaulted to zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub atomic_number: u32,
    pub symbol: String,
    pub name: String,
    pub atomic_mass: f64,
    #[serde(default = "unknown_category")]
    pub category: String,
    #[serde(default)]
    pub group: Option<u32>,
    #[serde(default)]
    pub period: Option<u32>,
    #[serde(default)]
    pub block: Option<String>,
    #[serde(default)]
    pub electron_configuration: Option<String>,
    #[serde(default)]
    pub state: ElementState,
    #[serde(default)]
    pub electronegativity: Option<f64>,
    #[serde(default)]
    pub atomic_radius: Option<f64>,
    #[serde(default)]
    pub ionization_energy: Option<f64>,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub melting_point: Option<f64>,
    #[serde(default)]
    pub boiling_point: Option<f64>,
}

fn unknown_category() -> String {
    "unknown".to_string()
}

impl Element {
    /// Minimal record, mostly for tests and synthetic scenes.
    pub fn new(atomic_number: u32, symbol: &str, name: &str, atomic_mass: f64) -> Self {
        Self {
            atomic_number,
            symbol: symbol.to_string(),
            name: name.to_string(),
            atomic_mass,
            category: unknown_category(),
            group: None,
            period: None,
            block: None,
            electron_configuration: None,
            state: ElementState::Unknown,
            electronegativity: None,
            atomic_radius: None,
            ionization_energy: None,
            density: None,
            melting_point: None,
            boiling_point: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn with_state(mut self, state: ElementState) -> Self {
        self.state = state;
        self
    }

    pub fn with_atomic_radius(mut self, radius: f64) -> Self {
        self.atomic_radius = Some(radius);
        self
    }

    // CSV feeds carry empty strings and zero placeholders for missing values.
    fn normalize(&mut self) {
        if self.category.trim().is_empty() {
            self.category = unknown_category();
        }
        if self.group == Some(0) {
            self.group = None;
        }
        if self.period == Some(0) {
            self.period = None;
        }
        if self.block.as_deref().is_some_and(|b| b.trim().is_empty()) {
            self.block = None;
        }
        if self
            .electron_configuration
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            self.electron_configuration = None;
        }
    }
}

/// Search text plus facet filters deciding which elements enter the scene.
/// Unset facets and an empty query match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementFilter {
    /// Case-insensitive substring of name, symbol or category.
    pub query: String,
    pub category: Option<String>,
    pub state: Option<ElementState>,
    pub period: Option<u32>,
    pub group: Option<u32>,
}

impl ElementFilter {
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.category.is_none()
            && self.state.is_none()
            && self.period.is_none()
            && self.group.is_none()
    }

    pub fn matches(&self, element: &Element) -> bool {
        let query = self.query.trim().to_lowercase();
        if !query.is_empty()
            && !element.name.to_lowercase().contains(&query)
            && !element.symbol.to_lowercase().contains(&query)
            && !element.category.to_lowercase().contains(&query)
        {
            return false;
        }
        if let Some(category) = &self.category {
            if category_key(category) != category_key(&element.category) {
                return false;
            }
        }
        if self.state.is_some_and(|s| s != element.state) {
            return false;
        }
        // Records without group/period fall back to the standard table slot.
        let slot = table_slot(element.atomic_number);
        let group = element.group.or(slot.map(|(g, _)| g));
        let period = element.period.or(slot.map(|(_, p)| p));
        if self.group.is_some() && self.group != group {
            return false;
        }
        if self.period.is_some() && self.period != period {
            return false;
        }
        true
    }

    /// Matching records, in feed order.
    pub fn apply(&self, elements: &[Element]) -> Vec<Element> {
        elements.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

pub fn parse_elements_json(text: &str) -> Result<Vec<Element>, ElementDataError> {
    let elements: Vec<Element> = serde_json::from_str(text)?;
    finish(elements)
}

pub fn parse_elements_csv(text: &str) -> Result<Vec<Element>, ElementDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut elements = Vec::new();
    for record in reader.deserialize::<Element>() {
        elements.push(record?);
    }
    finish(elements)
}

/// Parse the JSON feed, falling back to the CSV feed when JSON is missing or
/// malformed.
pub fn load_elements(
    json: Option<&str>,
    csv: Option<&str>,
) -> Result<Vec<Element>, ElementDataError> {
    if let Some(text) = json {
        match parse_elements_json(text) {
            Ok(elements) => return Ok(elements),
            Err(e) => log::warn!("[data] JSON feed rejected, falling back to CSV: {}", e),
        }
    }
    match csv {
        Some(text) => parse_elements_csv(text),
        None => Err(ElementDataError::Empty),
    }
}

pub fn builtin_elements() -> Result<Vec<Element>, ElementDataError> {
    parse_elements_json(BUILTIN_ELEMENTS_JSON)
}

fn finish(mut elements: Vec<Element>) -> Result<Vec<Element>, ElementDataError> {
    if elements.is_empty() {
        return Err(ElementDataError::Empty);
    }
    for e in &mut elements {
        if e.atomic_number == 0 || e.atomic_number > MAX_ATOMIC_NUMBER {
            return Err(ElementDataError::AtomicNumberOutOfRange(e.atomic_number));
        }
        e.normalize();
    }
    elements.sort_by_key(|e| e.atomic_number);
    if let Some(pair) = elements
        .windows(2)
        .find(|w| w[0].atomic_number == w[1].atomic_number)
    {
        return Err(ElementDataError::DuplicateAtomicNumber(pair[0].atomic_number));
    }
    log::info!("[data] loaded {} element record(s)", elements.len());
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_table_is_one_based() {
        assert_eq!(symbol_for(1), Some("H"));
        assert_eq!(symbol_for(26), Some("Fe"));
        assert_eq!(symbol_for(118), Some("Og"));
        assert_eq!(symbol_for(0), None);
        assert_eq!(symbol_for(119), None);
    }

    #[test]
    fn builtin_symbols_match_table() {
        let elements = builtin_elements().unwrap();
        assert_eq!(elements.len(), 118);
        for e in &elements {
            assert_eq!(Some(e.symbol.as_str()), symbol_for(e.atomic_number));
        }
    }
}
