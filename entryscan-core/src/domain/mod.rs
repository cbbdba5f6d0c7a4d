//! Domain types for EntryScan

pub mod bar;
pub mod instrument;
pub mod record;
pub mod series;

pub use bar::PriceBar;
pub use instrument::Instrument;
pub use record::{DecisionRecord, ScoreRecord, Signal};
pub use series::{PriceSeries, SeriesError};
