//! Volume profile zoning

use crate::data::Candle;
use serde::{Deserialize, Serialize};

/// Number of equal-width price zones
pub const VOLUME_ZONES: usize = 10;

/// Zone volume must exceed this multiple of the average candle volume to be a node
pub const HIGH_VOLUME_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeZone {
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

impl VolumeZone {
    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Volume distributed over price zones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub zones: Vec<VolumeZone>,
    /// Midpoints of high-volume zones, ascending
    pub high_volume_nodes: Vec<f64>,
    /// Midpoint of the zone holding the most volume
    pub point_of_control: Option<f64>,
}

impl VolumeProfile {
    /// High-volume nodes at or below `price`, nearest first
    pub fn support_levels(&self, price: f64) -> Vec<f64> {
        let mut levels: Vec<f64> = self
            .high_volume_nodes
            .iter()
            .copied()
            .filter(|&node| node <= price)
            .collect();
        levels.sort_by(|a, b| b.total_cmp(a));
        levels
    }

    /// High-volume nodes at or above `price`, nearest first
    pub fn resistance_levels(&self, price: f64) -> Vec<f64> {
        let mut levels: Vec<f64> = self
            .high_volume_nodes
            .iter()
            .copied()
            .filter(|&node| node >= price)
            .collect();
        levels.sort_by(|a, b| a.total_cmp(b));
        levels
    }
}

/// Build a volume profile over the candles' combined high/low range.
///
/// Each candle's volume is split across zones in proportion to how much of
/// its high-low range overlaps each zone. An empty window or a window with
/// no price range yields an empty profile.
pub fn volume_profile(candles: &[Candle]) -> VolumeProfile {
    let (Some(high), Some(low)) = (
        candles.iter().map(|c| c.high).reduce(f64::max),
        candles.iter().map(|c| c.low).reduce(f64::min),
    ) else {
        return VolumeProfile::default();
    };
    let width = (high - low) / VOLUME_ZONES as f64;
    if width <= 0.0 {
        return VolumeProfile::default();
    }

    let mut zones: Vec<VolumeZone> = (0..VOLUME_ZONES)
        .map(|i| VolumeZone {
            low: low + width * i as f64,
            high: low + width * (i + 1) as f64,
            volume: 0.0,
        })
        .collect();

    for candle in candles {
        let range = candle.range();
        if range <= 0.0 {
            let idx = (((candle.close - low) / width).floor() as usize).min(VOLUME_ZONES - 1);
            zones[idx].volume += candle.volume;
            continue;
        }
        for zone in zones.iter_mut() {
            let overlap = candle.high.min(zone.high) - candle.low.max(zone.low);
            if overlap > 0.0 {
                zone.volume += candle.volume * overlap / range;
            }
        }
    }

    let avg_volume = candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64;
    let threshold = avg_volume * HIGH_VOLUME_FACTOR;
    let high_volume_nodes = zones
        .iter()
        .filter(|z| z.volume > threshold)
        .map(VolumeZone::midpoint)
        .collect();
    let point_of_control = zones
        .iter()
        .max_by(|a, b| a.volume.total_cmp(&b.volume))
        .map(VolumeZone::midpoint);

    VolumeProfile {
        zones,
        high_volume_nodes,
        point_of_control,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_is_conserved() {
        let candles: Vec<Candle> = (0..20)
            .map(|i| {
                let p = 100.0 + (i % 5) as f64;
                Candle::new(i, p, p + 2.0, p - 2.0, p + 1.0, 50.0 + i as f64)
            })
            .collect();
        let profile = volume_profile(&candles);
        let total: f64 = profile.zones.iter().map(|z| z.volume).sum();
        let expected: f64 = candles.iter().map(|c| c.volume).sum();
        assert_eq!(profile.zones.len(), VOLUME_ZONES);
        assert!((total - expected).abs() < 1e-6);
    }

    #[test]
    fn test_high_volume_node_at_congestion() {
        // nine tight candles around 100 and one wide candle spanning 90..110
        let mut candles: Vec<Candle> = (0..9)
            .map(|i| Candle::new(i, 100.0, 100.5, 99.5, 100.0, 100.0))
            .collect();
        candles.push(Candle::new(9, 100.0, 110.0, 90.0, 100.0, 100.0));
        let profile = volume_profile(&candles);
        assert_eq!(profile.high_volume_nodes.len(), 2);
        assert!(profile
            .high_volume_nodes
            .iter()
            .all(|&n| (n - 100.0).abs() <= 1.0));
        assert_eq!(profile.support_levels(105.0).len(), 2);
        assert!(profile.resistance_levels(105.0).is_empty());
    }

    #[test]
    fn test_flat_window_is_empty() {
        let candles = vec![Candle::new(0, 5.0, 5.0, 5.0, 5.0, 1.0); 3];
        assert_eq!(volume_profile(&candles), VolumeProfile::default());
        assert_eq!(volume_profile(&[]), VolumeProfile::default());
    }
}
