//! Courier Quest - Entry Point
//!
//! Loads the city, jobs and weather (live, cached or bundled), then runs a
//! text command loop over a single delivery run.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use courier_quest::core::config::{GameConfig, ProviderConfig};
use courier_quest::core::error::Result;
use courier_quest::game::{Command, Game};
use courier_quest::history::{Leaderboard, SaveStore};
use courier_quest::provider::{ContentProvider, DiskCache, HttpSource};

/// Courier Quest - deliver enough orders before the clock runs out
#[derive(Parser, Debug)]
#[command(name = "courier-quest")]
#[command(about = "Text-mode delivery courier simulation")]
struct Args {
    /// TOML file overriding the default tuning values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic weather and job placement
    #[arg(long)]
    seed: Option<u64>,

    /// Never contact the city API; read cached or bundled data only
    #[arg(long)]
    offline: bool,

    /// Base URL of the city API
    #[arg(long)]
    api_url: Option<String>,

    /// Directory refreshed with every live fetch
    #[arg(long, default_value = "api_cache")]
    cache_dir: PathBuf,

    /// Bundled data read when nothing is cached
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Where save slots and the score table live
    #[arg(long, default_value = "saves")]
    save_dir: PathBuf,

    /// Name written to the leaderboard
    #[arg(long, default_value = "Player")]
    name: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("courier_quest=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut provider_config = ProviderConfig {
        cache_dir: args.cache_dir.clone(),
        fallback_dir: args.data_dir.clone(),
        ..ProviderConfig::default()
    };
    if let Some(url) = &args.api_url {
        provider_config.base_url = url.clone();
    }

    // Async runtime only for the up-front content fetch
    let rt = Runtime::new()?;
    let mut provider = ContentProvider::new(
        HttpSource::from_config(&provider_config),
        DiskCache::from_config(&provider_config),
    );
    provider.set_offline(args.offline);

    let mut spawn_rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let bundle = rt.block_on(async {
        provider.probe().await;
        provider.load_all(&mut spawn_rng).await
    })?;

    let saves = SaveStore::new(&args.save_dir);
    let leaderboard = Leaderboard::open(args.save_dir.join("scores.json"), config.leaderboard_size)?;
    let mut game = Game::new(config, bundle, saves, leaderboard, args.name.clone())?;

    println!("\n=== COURIER QUEST ===");
    println!(
        "Earn ${:.0} in {:.0} seconds without letting your reputation drop below {}.",
        game.courier().income_goal(),
        game.config().run_duration_secs,
        game.config().defeat_reputation
    );
    print_help();

    // Main game loop
    loop {
        if let Some(outcome) = game.outcome() {
            println!();
            println!("{}", if outcome.is_victory() { "VICTORY" } else { "DEFEAT" });
            println!("  Reason:     {:?}", outcome.reason);
            println!("  Score:      {}", outcome.score);
            println!("  Income:     ${:.2}", outcome.income);
            println!("  Reputation: {}", outcome.reputation);
            print_leaderboard(&game);
            break;
        }

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match Command::parse(input) {
            Some(Command::Quit) => break,
            Some(Command::Help) => print_help(),
            Some(Command::Status) => display_status(&game),
            Some(Command::Orders) => display_orders(&game),
            Some(Command::Act(action)) => {
                let weather_before = game.weather().condition().clone();
                let outcome = game.apply(action);
                println!("{}", outcome);
                if game.weather().condition() != &weather_before {
                    println!("Weather is now {}", game.weather().condition());
                }
            }
            None => println!("Unknown command. Type 'help' for the list."),
        }
    }

    println!("\nGoodbye! Run {} finished after {:.1}s.", game.run_id(), game.elapsed());
    Ok(())
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  move <dir> / up / down / left / right  - Ride one tile");
    println!("  accept                                 - Pick up the job on this tile");
    println!("  next / prev                            - Select carried order");
    println!("  sort priority|deadline|payout          - Reorder carried orders");
    println!("  deliver                                - Deliver selected order here");
    println!("  cancel                                 - Drop selected order (-4 reputation)");
    println!("  wait [seconds]                         - Stand still and recover");
    println!("  save [slot] / load [slot]              - Save slots");
    println!("  undo [steps]                           - Step back through recent moves");
    println!("  status / orders                        - Show run state");
    println!("  quit                                   - Exit");
    println!();
}

/// Display the courier summary line
fn display_status(game: &Game) {
    let courier = game.courier();
    println!();
    println!(
        "--- t={:.1}s ({:.0}s left) | {} | weather {} (x{:.2}) ---",
        game.elapsed(),
        game.remaining_secs(),
        courier.position(),
        game.weather().condition(),
        game.weather().effective_multiplier()
    );
    println!(
        "  Income ${:.2}/{:.0}  Reputation {}  Stamina {:.1}{}",
        courier.total_income(),
        courier.income_goal(),
        courier.reputation(),
        courier.stamina(),
        if courier.is_exhausted() { " (exhausted)" } else { "" }
    );
    println!(
        "  Load {:.1}/{:.1}  Carrying {}  Jobs on offer {}",
        courier.queue().current_weight(),
        courier.queue().max_weight(),
        courier.queue().len(),
        game.board().available().len()
    );
    if game.map().is_rest_point(courier.position()) {
        println!("  Resting spot: standing still recovers faster");
    }
}

fn display_orders(game: &Game) {
    let queue = game.courier().queue();
    println!();
    if queue.is_empty() {
        println!("Carrying nothing.");
    } else {
        println!("Carrying:");
        for (i, order) in queue.iter().enumerate() {
            let marker = if queue.cursor_index() == Some(i) { ">" } else { " " };
            println!(" {} {}", marker, order);
        }
    }

    let available = game.board().available();
    if !available.is_empty() {
        println!("On offer:");
        for order in available {
            println!("   {}", order);
        }
    }
}

fn print_leaderboard(game: &Game) {
    println!();
    println!("Top scores:");
    for (rank, entry) in game.leaderboard().entries().iter().enumerate() {
        println!(
            "  {:>2}. {:<12} {:>6}  (${:.0}, rep {})",
            rank + 1,
            entry.name,
            entry.score,
            entry.income,
            entry.reputation
        );
    }
}
