use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use plotland::Position;
use rand::rngs::StdRng;
use rand::SeedableRng;
use teller::{ActionError, BoardSetup, ConsoleNotify, GameConfig, GameService, MemoryStore};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Local console front-end for the land-trading game engine.
#[derive(Parser)]
struct Args {
    /// Path to the game constants JSON; defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the board layout JSON; a demo 3x3 world is used when absent
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let setup = match &args.board {
        Some(path) => BoardSetup::load(path)?,
        None => BoardSetup::demo(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);

    let store = MemoryStore::new(config.initial_bank_balance);
    for (position, cell) in setup.build() {
        store.put_cell(position, cell);
    }
    let service = GameService::with_rng(
        config,
        store,
        Box::new(ConsoleNotify),
        StdRng::seed_from_u64(seed),
    );

    println!("Commands: start <name> | roll | buy | offers | sell <x> <y> | as <id> | quit");
    let mut current = String::from("player-1");
    let stdin = std::io::stdin().lock();
    print_prompt(&current)?;
    for line in stdin.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["as", id] => {
                current = id.to_string();
                println!("Acting as {}", current);
            }
            ["start", name @ ..] if !name.is_empty() => {
                print_result(service.start_game(&current, &name.join(" ")));
            }
            ["roll"] => print_result(service.take_turn(&current)),
            ["buy"] => print_result(service.buy_current_cell(&current)),
            ["offers"] => match service.list_sellable_cells(&current) {
                Ok(offers) if offers.is_empty() => println!("You have no plots to sell."),
                Ok(offers) => {
                    for offer in offers {
                        println!(
                            "Plot {} - sells for {} coins",
                            offer.position, offer.estimated_price
                        );
                    }
                }
                Err(err) => println!("{}", err),
            },
            ["sell", x, y] => match (x.parse::<i32>(), y.parse::<i32>()) {
                (Ok(x), Ok(y)) => {
                    print_result(service.sell_cell(&current, Position::new(x, y)));
                }
                _ => println!("Usage: sell <x> <y>"),
            },
            _ => println!("Unknown command."),
        }
        print_prompt(&current)?;
    }

    Ok(())
}

fn print_result(result: Result<plotland::Reply, ActionError>) {
    match result {
        Ok(reply) => println!("{}", reply.message),
        Err(err) => println!("{}", err),
    }
}

fn print_prompt(current: &str) -> std::io::Result<()> {
    print!("{}> ", current);
    std::io::stdout().flush()
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
