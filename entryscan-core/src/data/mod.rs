//! Market data: provider adapters, normalization and the scan universe.

pub mod circuit_breaker;
pub mod csv_dir;
pub mod normalize;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_dir::CsvProvider;
pub use normalize::normalize;
pub use provider::{
    BarInterval, DataError, DataProvider, DataSource, FetchResult, LookbackPeriod, RawBar,
};
pub use synthetic::SyntheticProvider;
pub use universe::Universe;
pub use yahoo::YahooProvider;
