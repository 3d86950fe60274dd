use serde::{Deserialize, Serialize};

use crate::buckets::{DistanceBucket, distance_bucket};
use crate::play::{PlayRecord, PlayType};
use crate::rate_aggregator::aggregate_rates;

pub const LEAGUE_MIN_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueRate {
    pub down: u8,
    pub distance: DistanceBucket,
    pub play_type: PlayType,
    pub success_rate: f64,
    pub sample_size: usize,
}

/// League-wide conversion rate on third and fourth down, by down, distance
/// band and play type.
pub fn league_conversion_rates(plays: &[PlayRecord]) -> Vec<LeagueRate> {
    let late_downs = plays.iter().filter(|p| matches!(p.down, 3 | 4));
    aggregate_rates(
        late_downs,
        |p| Some((p.down, distance_bucket(p.ydstogo), p.play_type)),
        |p| [p.first_down_converted],
        LEAGUE_MIN_SAMPLES,
    )
    .into_iter()
    .map(|group| {
        let (down, distance, play_type) = group.key;
        LeagueRate {
            down,
            distance,
            play_type,
            success_rate: group.rates[0],
            sample_size: group.sample_size,
        }
    })
    .collect()
}
