use serde::{Deserialize, Serialize};

use crate::play::{PlayRecord, PlayTable, PlayType};
use crate::rate_aggregator::aggregate_labelled_rates;

pub const PLAYER_MIN_SAMPLES: usize = 10;
pub const PLAYER_LIST_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPosition {
    #[serde(rename = "WR")]
    Receiver,
    #[serde(rename = "RB")]
    Rusher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRate {
    pub player_id: String,
    pub player_name: String,
    pub position: PlayerPosition,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverStat {
    pub player_id: String,
    pub player_name: String,
    pub catch_rate: f64,
    pub conversion_rate: f64,
    pub targets: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RusherStat {
    pub player_id: String,
    pub player_name: String,
    pub conversion_rate: f64,
    pub carries: usize,
}

/// Top third-down receivers followed by top third-down rushers.
pub fn player_success_rates(table: &PlayTable) -> Vec<PlayerRate> {
    let receivers = if table.columns.receiver_identity {
        receiver_stats(&table.plays)
    } else {
        eprintln!("[WARN] receiver_player_id column not found, skipping receiver stats");
        Vec::new()
    };
    let rushers = if table.columns.rusher_identity {
        rusher_stats(&table.plays)
    } else {
        Vec::new()
    };

    let mut out = Vec::with_capacity(receivers.len() + rushers.len());
    out.extend(receivers.into_iter().map(|r| PlayerRate {
        player_id: r.player_id,
        player_name: r.player_name,
        position: PlayerPosition::Receiver,
        conversion_rate: r.conversion_rate,
    }));
    out.extend(rushers.into_iter().map(|r| PlayerRate {
        player_id: r.player_id,
        player_name: r.player_name,
        position: PlayerPosition::Rusher,
        conversion_rate: r.conversion_rate,
    }));
    out
}

pub fn receiver_stats(plays: &[PlayRecord]) -> Vec<ReceiverStat> {
    let targets = plays
        .iter()
        .filter(|p| p.is_third_down() && p.play_type == PlayType::Pass);
    let mut stats = aggregate_labelled_rates(
        targets,
        |p| p.receiver_id.as_deref(),
        |p| p.receiver_name.as_deref(),
        |p| [p.completed, p.first_down_converted],
        PLAYER_MIN_SAMPLES,
    )
    .into_iter()
    .filter_map(|group| {
        let player_name = group.label?;
        let [catch_rate, conversion_rate] = group.rates;
        Some(ReceiverStat {
            player_id: group.key.to_string(),
            player_name: player_name.to_string(),
            catch_rate,
            conversion_rate,
            targets: group.sample_size,
        })
    })
    .collect::<Vec<_>>();

    rank_by_conversion(&mut stats, |s| s.conversion_rate);
    stats
}

pub fn rusher_stats(plays: &[PlayRecord]) -> Vec<RusherStat> {
    let carries = plays
        .iter()
        .filter(|p| p.is_third_down() && p.play_type == PlayType::Run);
    let mut stats = aggregate_labelled_rates(
        carries,
        |p| p.rusher_id.as_deref(),
        |p| p.rusher_name.as_deref(),
        |p| [p.first_down_converted],
        PLAYER_MIN_SAMPLES,
    )
    .into_iter()
    .filter_map(|group| {
        let player_name = group.label?;
        Some(RusherStat {
            player_id: group.key.to_string(),
            player_name: player_name.to_string(),
            conversion_rate: group.rates[0],
            carries: group.sample_size,
        })
    })
    .collect::<Vec<_>>();

    rank_by_conversion(&mut stats, |s| s.conversion_rate);
    stats
}

// Stable: equal rates keep first-seen order.
fn rank_by_conversion<T>(stats: &mut Vec<T>, rate: impl Fn(&T) -> f64) {
    stats.sort_by(|a, b| rate(b).total_cmp(&rate(a)));
    stats.truncate(PLAYER_LIST_LIMIT);
}
