//! Shared batch workflow used by the generator binary and the benchmarks:
//! filtered play table -> four independent calculators -> one document.

use crate::field_position::{FieldPositionRate, field_position_impact};
use crate::league_rates::{LeagueRate, league_conversion_rates};
use crate::output::OutputDocument;
use crate::play::PlayTable;
use crate::player_rates::{PlayerRate, player_success_rates};
use crate::season_loader::LoadedSeason;
use crate::team_rates::{TeamRate, team_conversion_rates};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Parallel,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateSets {
    pub league: Vec<LeagueRate>,
    pub team: Vec<TeamRate>,
    pub field_position: Vec<FieldPositionRate>,
    pub players: Vec<PlayerRate>,
}

/// Runs every calculator over the same read-only table.
pub fn compute_rate_sets(table: &PlayTable, execution: Execution) -> RateSets {
    if !table.columns.touchdown {
        eprintln!("[WARN] touchdown column not found, td_rate will be 0 for every zone");
    }
    match execution {
        Execution::Sequential => RateSets {
            league: league_conversion_rates(&table.plays),
            team: team_conversion_rates(&table.plays),
            field_position: field_position_impact(&table.plays),
            players: player_success_rates(table),
        },
        Execution::Parallel => {
            let ((league, team), (field_position, players)) = rayon::join(
                || {
                    rayon::join(
                        || league_conversion_rates(&table.plays),
                        || team_conversion_rates(&table.plays),
                    )
                },
                || {
                    rayon::join(
                        || field_position_impact(&table.plays),
                        || player_success_rates(table),
                    )
                },
            );
            RateSets {
                league,
                team,
                field_position,
                players,
            }
        }
    }
}

pub fn build_document(
    loaded: &LoadedSeason,
    execution: Execution,
    generated_at: impl Into<String>,
) -> OutputDocument {
    let rates = compute_rate_sets(&loaded.table, execution);
    OutputDocument::assemble(loaded.season, &loaded.table, rates, generated_at)
}
