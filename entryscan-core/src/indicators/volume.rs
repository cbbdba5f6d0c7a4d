//! Volume spike detection.

use crate::domain::PriceBar;

/// Number of trailing bars (latest included) in the volume baseline.
pub const VOLUME_BASELINE_BARS: usize = 20;

/// True when the latest volume exceeds `multiplier` × the mean volume of the
/// last `VOLUME_BASELINE_BARS` bars (latest bar included).
///
/// Returns false for an empty series or a zero baseline.
pub fn volume_spike(bars: &[PriceBar], multiplier: f64) -> bool {
    let Some(latest) = bars.last() else {
        return false;
    };
    let tail = &bars[bars.len().saturating_sub(VOLUME_BASELINE_BARS)..];
    let baseline = tail.iter().map(|b| b.volume).sum::<f64>() / tail.len() as f64;
    baseline > 0.0 && latest.volume > baseline * multiplier
}
