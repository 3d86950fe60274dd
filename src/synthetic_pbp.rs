use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::play::{PlayTable, RawPlay, SourceColumns};
use crate::season_loader::PlaySource;

const TEAMS: [&str; 8] = ["BUF", "KC", "PHI", "SF", "DET", "BAL", "MIA", "DAL"];
const RECEIVERS_PER_TEAM: usize = 4;
const RUSHERS_PER_TEAM: usize = 2;

/// Seeded stand-in for the real provider, for offline runs and benchmarks.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSource {
    pub seed: u64,
    pub plays_per_season: usize,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            seed: 2024,
            plays_per_season: 35_000,
        }
    }
}

impl PlaySource for SyntheticSource {
    fn load_season(&self, season: u16) -> Result<PlayTable> {
        Ok(synthetic_table(season, self.seed, self.plays_per_season))
    }
}

/// Same `(season, seed, rows)` always gives the same table.
pub fn synthetic_table(season: u16, seed: u64, rows: usize) -> PlayTable {
    let mut rng = StdRng::seed_from_u64(seed ^ u64::from(season));
    let raw = (0..rows).map(|_| synthetic_play(&mut rng)).collect::<Vec<_>>();
    PlayTable::from_raw_rows(raw, SourceColumns::all())
}

fn synthetic_play(rng: &mut StdRng) -> RawPlay {
    let team_idx = rng.gen_range(0..TEAMS.len());
    let team = TEAMS[team_idx];
    let down: u8 = rng.gen_range(1..=4);
    let ydstogo: u8 = match rng.gen_range(0..10) {
        0..=2 => rng.gen_range(1..=3),
        3..=5 => rng.gen_range(4..=6),
        6..=8 => rng.gen_range(7..=10),
        _ => rng.gen_range(11..=25),
    };
    let yardline_100: u8 = rng.gen_range(1..=99);
    let is_pass = rng.gen_bool(0.58);

    // Shorter yardage converts more often; the red zone scores more often.
    let convert_p = (0.75 - f64::from(ydstogo) * 0.035).clamp(0.12, 0.8);
    let first_down = rng.gen_bool(convert_p);
    let touchdown = first_down && rng.gen_bool(if yardline_100 <= 10 { 0.45 } else { 0.04 });

    let mut raw = RawPlay {
        down: Some(f64::from(down)),
        ydstogo: Some(f64::from(ydstogo)),
        play_type: Some(if is_pass { "pass" } else { "run" }.to_string()),
        posteam: Some(team.to_string()),
        yardline_100: Some(f64::from(yardline_100)),
        first_down: Some(first_down && !touchdown),
        touchdown: Some(touchdown),
        ..Default::default()
    };

    if is_pass {
        let slot = rng.gen_range(0..RECEIVERS_PER_TEAM);
        let completed = first_down || rng.gen_bool(0.35);
        raw.complete_pass = Some(completed);
        raw.pass_length = completed.then(|| "short".to_string());
        raw.receiver_player_id = Some(format!("00-{team_idx:02}{slot:02}"));
        raw.receiver_player_name = Some(format!("{team}.WR{}", slot + 1));
    } else {
        let slot = rng.gen_range(0..RUSHERS_PER_TEAM);
        raw.rusher_player_id = Some(format!("00-{team_idx:02}9{slot}"));
        raw.rusher_player_name = Some(format!("{team}.RB{}", slot + 1));
    }
    raw
}
