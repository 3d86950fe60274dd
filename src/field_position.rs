use serde::{Deserialize, Serialize};

use crate::buckets::{FieldZone, field_zone};
use crate::play::{PlayRecord, PlayType};
use crate::rate_aggregator::aggregate_rates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPositionRate {
    pub zone: FieldZone,
    pub play_type: PlayType,
    pub conversion_rate: f64,
    pub td_rate: f64,
    pub sample_size: usize,
}

/// Third-down conversion and touchdown rates by field zone and play type.
///
/// Unlike the league and team tables there is no minimum sample size here:
/// every zone that saw a play is reported.
pub fn field_position_impact(plays: &[PlayRecord]) -> Vec<FieldPositionRate> {
    let third_downs = plays.iter().filter(|p| p.is_third_down());
    aggregate_rates(
        third_downs,
        |p| Some((field_zone(p.yardline_100), p.play_type)),
        |p| [p.first_down_converted, p.touchdown],
        0,
    )
    .into_iter()
    .map(|group| {
        let (zone, play_type) = group.key;
        let [conversion_rate, td_rate] = group.rates;
        FieldPositionRate {
            zone,
            play_type,
            conversion_rate,
            td_rate,
            sample_size: group.sample_size,
        }
    })
    .collect()
}
