//! Postal code table (US ZIP codes and Canadian forward sortation areas).
//!
//! The bundled table carries every USPS ZIP code plus the Canadian FSAs of
//! the major metro areas. A fuller table can be supplied with `postal_codes`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ZmanimError, ZmanimResult};

static BUNDLED_POSTAL_CODES: &str = include_str!("../../data/zipcodes.json");

/// One row of the postal dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostalCode {
    pub zip: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// In-memory postal code index keyed by normalized code.
#[derive(Debug, Clone)]
pub struct PostalTable {
    entries: HashMap<String, PostalCode>,
}

impl PostalTable {
    /// Table built from the dataset shipped with the crate.
    pub fn bundled() -> ZmanimResult<Self> {
        Self::from_json(BUNDLED_POSTAL_CODES)
    }

    /// Load a dataset in the bundled JSON format from disk.
    pub fn from_path(path: &Path) -> ZmanimResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ZmanimError::PostalData(format!("Could not read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ZmanimResult<Self> {
        let rows: Vec<PostalCode> =
            serde_json::from_str(content).map_err(|e| ZmanimError::PostalData(e.to_string()))?;

        let entries = rows
            .into_iter()
            .filter_map(|row| normalize_code(&row.zip).map(|key| (key, row)))
            .collect();

        Ok(PostalTable { entries })
    }

    pub fn lookup(&self, code: &str) -> Option<&PostalCode> {
        self.entries.get(&normalize_code(code)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical key for a postal code:
/// - US: the five-digit ZIP (ZIP+4 suffix dropped)
/// - Canada: the three-character FSA, upper-cased
fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim().to_uppercase();

    if code.starts_with(|c: char| c.is_ascii_digit()) {
        let zip: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
        return (zip.len() == 5).then_some(zip);
    }

    let fsa: String = code.chars().filter(|c| !c.is_whitespace()).take(3).collect();
    let mut chars = fsa.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(d), Some(b))
            if a.is_ascii_alphabetic() && d.is_ascii_digit() && b.is_ascii_alphabetic() =>
        {
            Some(fsa)
        }
        _ => None,
    }
}
