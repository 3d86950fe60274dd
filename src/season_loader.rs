use std::fmt;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};

use crate::play::PlayTable;

/// Anything that can hand over one season of filtered plays.
pub trait PlaySource {
    fn load_season(&self, season: u16) -> Result<PlayTable>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonPlan {
    pub primary: u16,
    pub fallback: u16,
}

impl SeasonPlan {
    pub fn starting_at(primary: u16) -> Self {
        Self {
            primary,
            fallback: primary.saturating_sub(1),
        }
    }

    pub fn for_date(today: NaiveDate) -> Self {
        Self::starting_at(current_season(today))
    }
}

/// Season year a date belongs to. Seasons kick off in September, so January
/// through August still count toward the previous year's season.
pub fn current_season(today: NaiveDate) -> u16 {
    let year = today.year();
    let season = if today.month() >= 9 { year } else { year - 1 };
    season.clamp(0, i32::from(u16::MAX)) as u16
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeason {
    pub season: u16,
    pub used_fallback: bool,
    pub table: PlayTable,
}

/// Both the primary and the fallback season failed to load.
#[derive(Debug)]
pub struct SeasonLoadError {
    pub primary: u16,
    pub primary_error: anyhow::Error,
    pub fallback: u16,
    pub fallback_error: anyhow::Error,
}

impl fmt::Display for SeasonLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no play-by-play data for season {} ({:#}) or season {} ({:#})",
            self.primary, self.primary_error, self.fallback, self.fallback_error
        )
    }
}

impl std::error::Error for SeasonLoadError {}

pub fn resolve_season(
    source: &dyn PlaySource,
    plan: SeasonPlan,
) -> Result<LoadedSeason, SeasonLoadError> {
    let primary_error = match source.load_season(plan.primary) {
        Ok(table) => {
            return Ok(LoadedSeason {
                season: plan.primary,
                used_fallback: false,
                table,
            });
        }
        Err(err) => err,
    };

    eprintln!(
        "[WARN] {} data not available ({:#}), using {}",
        plan.primary, primary_error, plan.fallback
    );

    match source.load_season(plan.fallback) {
        Ok(table) => Ok(LoadedSeason {
            season: plan.fallback,
            used_fallback: true,
            table,
        }),
        Err(fallback_error) => Err(SeasonLoadError {
            primary: plan.primary,
            primary_error,
            fallback: plan.fallback,
            fallback_error,
        }),
    }
}
