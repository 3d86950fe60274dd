use std::process::ExitCode;

use anyhow::Result;

use nfl_probability::config::{self, GeneratorConfig};
use nfl_probability::output::{self, OutputDocument};
use nfl_probability::pipeline::{self, RateSets};
use nfl_probability::season_loader::{self, LoadedSeason, SeasonPlan};

fn main() -> ExitCode {
    config::load_dotenv();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cfg = GeneratorConfig::from_process()?;
    let rule = "=".repeat(60);

    println!("{rule}");
    println!("NFL Probability Data Generator");
    println!("{rule}");
    println!();

    println!("Loading NFL play-by-play data...");
    let plan = match cfg.season {
        Some(season) => SeasonPlan::starting_at(season),
        None => SeasonPlan::for_date(chrono::Utc::now().date_naive()),
    };
    let source = cfg.play_source();
    let loaded = season_loader::resolve_season(source.as_ref(), plan)?;
    println!("  Using {} season data", loaded.season);
    println!(
        "Loaded {} plays from {} season",
        loaded.table.len(),
        loaded.season
    );
    println!();

    println!("Calculating probabilities...");
    let rates = pipeline::compute_rate_sets(&loaded.table, cfg.execution);
    print_rate_counts(&rates);
    println!();

    let doc = OutputDocument::assemble(
        loaded.season,
        &loaded.table,
        rates,
        output::generated_now(),
    );

    println!("Saving to {}...", cfg.out_path.display());
    output::write_document(&cfg.out_path, &doc)?;
    println!("Saved probability data successfully");
    println!();

    print_summary(&rule, &loaded, &doc);
    Ok(())
}

fn print_rate_counts(rates: &RateSets) {
    print_count("[1/4] League-wide conversion rates", rates.league.len());
    print_count("[2/4] Team-specific conversion rates", rates.team.len());
    print_count("[3/4] Field position rates", rates.field_position.len());
    print_count("[4/4] Player success rates", rates.players.len());
}

fn print_summary(rule: &str, loaded: &LoadedSeason, doc: &OutputDocument) {
    println!("{rule}");
    println!("Summary:");
    println!("  Season: {}", doc.season);
    if loaded.used_fallback {
        println!("  (fell back from the newest season)");
    }
    print_count("Total plays analyzed", doc.total_plays);
    print_count("League conversion rates", doc.league_conversion_rates.len());
    print_count("Team-specific rates", doc.team_conversion_rates.len());
    print_count("Field position rates", doc.field_position_impact.len());
    print_count("Player success rates", doc.player_success_rates.len());
    println!("{rule}");
}

fn print_count(label: &str, count: usize) {
    println!("  {label}: {count}");
}
