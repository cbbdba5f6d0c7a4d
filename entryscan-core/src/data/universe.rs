//! Scan universe: the ordered list of instruments to analyze.
//!
//! Stored as TOML with one `[[instruments]]` table per entry. Order matters:
//! it is the tie-break order when two instruments score the same confidence.

use crate::domain::Instrument;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read universe file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string. Duplicate symbols are rejected.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let universe: Self =
            toml::from_str(content).map_err(|e| format!("parse universe TOML: {e}"))?;
        let mut seen = HashSet::new();
        for inst in &universe.instruments {
            if inst.symbol.trim().is_empty() {
                return Err(format!("instrument '{}' has an empty symbol", inst.display_name));
            }
            if !seen.insert(inst.symbol.as_str()) {
                return Err(format!("duplicate symbol in universe: {}", inst.symbol));
            }
        }
        Ok(universe)
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize universe: {e}"))
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Bursa Malaysia blue chips plus two commodity futures.
    pub fn default_universe() -> Self {
        let instruments = [
            ("MAYBANK", "1155.KL"),
            ("PBBANK", "1295.KL"),
            ("TENAGA", "5347.KL"),
            ("PETGAS", "6033.KL"),
            ("IOICORP", "1961.KL"),
            ("SIMEPLT", "5285.KL"),
            ("KLK", "2445.KL"),
            ("GENTING", "3182.KL"),
            ("GAMUDA", "5398.KL"),
            ("IJM", "3336.KL"),
            ("YTL", "4677.KL"),
            ("HARTA", "5168.KL"),
            ("TOPGLOV", "7113.KL"),
            ("INARI", "0166.KL"),
            ("CIMB", "1023.KL"),
            ("MAXIS", "6012.KL"),
            ("Crude Oil WTI", "CL=F"),
            ("Crude Palm Oil", "PALM.OIL"),
        ]
        .into_iter()
        .map(|(name, symbol)| Instrument::new(name, symbol))
        .collect();

        Self { instruments }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_universe()
    }
}
