//! Return volatility

use ta::indicators::StandardDeviation;
use ta::Next;

/// Default number of returns used for volatility
pub const VOLATILITY_LOOKBACK: usize = 20;

/// Close-to-close simple returns; steps from a zero close are skipped
pub fn returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Population standard deviation of the last `lookback` returns.
///
/// Uses every available return when fewer than `lookback` exist; `None`
/// with fewer than two returns.
pub fn return_volatility(closes: &[f64], lookback: usize) -> Option<f64> {
    let rets = returns(closes);
    let take = lookback.min(rets.len());
    if take < 2 {
        return None;
    }
    let mut std_dev = StandardDeviation::new(take).ok()?;
    rets[rets.len() - take..]
        .iter()
        .fold(None, |_, &r| Some(std_dev.next(r)))
}
