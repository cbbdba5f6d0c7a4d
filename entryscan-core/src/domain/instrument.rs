use serde::{Deserialize, Serialize};

/// A tradable instrument in the scan universe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub display_name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(display_name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            symbol: symbol.into(),
        }
    }

    /// Bursa Malaysia listings carry a `.KL` suffix and quote in ringgit.
    pub fn is_bursa_listing(&self) -> bool {
        self.symbol.ends_with(".KL")
    }

    /// Format a price the way the instrument's market quotes it.
    pub fn format_price(&self, price: f64) -> String {
        if self.is_bursa_listing() {
            format!("RM {price:.3}")
        } else {
            format!("{price:.2}")
        }
    }
}
