use serde::{Deserialize, Serialize};

use crate::buckets::{DistanceBucket, distance_bucket};
use crate::play::{PlayRecord, PlayType};
use crate::rate_aggregator::aggregate_rates;

pub const TEAM_MIN_SAMPLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRate {
    pub team: String,
    pub distance: DistanceBucket,
    pub play_type: PlayType,
    pub success_rate: f64,
    pub sample_size: usize,
}

/// Third-down conversion rate per offense. Plays without a possession team
/// never contribute.
pub fn team_conversion_rates(plays: &[PlayRecord]) -> Vec<TeamRate> {
    let third_downs = plays.iter().filter(|p| p.is_third_down());
    aggregate_rates(
        third_downs,
        |p| {
            let team = p.posteam.as_deref()?;
            Some((team, distance_bucket(p.ydstogo), p.play_type))
        },
        |p| [p.first_down_converted],
        TEAM_MIN_SAMPLES,
    )
    .into_iter()
    .map(|group| {
        let (team, distance, play_type) = group.key;
        TeamRate {
            team: team.to_string(),
            distance,
            play_type,
            success_rate: group.rates[0],
            sample_size: group.sample_size,
        }
    })
    .collect()
}
