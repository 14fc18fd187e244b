//! Headless game simulator.
//!
//! Seats a few players, plays a number of rounds with a simple card policy
//! and prints the final standings.

use anyhow::{Context, Error};
use log::info;
use money_energy::{
    BusTopic, CardAction, DeckType, EventBus, EventOrchestrator, GameConfig,
    InMemoryPlayerManager, Player, PlayerId, PlayerManager, Profession, RollOptions,
};
use pico_args::Arguments;
use std::{fs, path::PathBuf};

const HELP: &str = "\
Simulate a game of Money Energy

USAGE:
  simulate [OPTIONS]

OPTIONS:
  --players    N           Number of players (1-6)          [default: 3]
  --rounds     N           Rounds to play                   [default: 20]
  --seed       N           Seed for a reproducible game     [default: random]
  --config     PATH        JSON game configuration          [default: env]

FLAGS:
  --json                   Print final players as JSON
  -h, --help               Print help information

ENVIRONMENT:
  RUST_LOG                 Log filter (e.g. info, money_energy=debug)
  BOARD_INNER_TRACK_CELLS  Inner track size
  BOARD_OUTER_TRACK_CELLS  Outer track size
  BOARD_PAYDAY_POSITION    PAYDAY cell offset
  BOARD_CHARITY_POSITION   Charity cell offset
  BOARD_BABY_POSITION      Baby cell offset on the inner track
  DICE_MIN_VALUE           Lowest die face
  DICE_MAX_VALUE           Highest die face
";

const NAMES: [&str; 6] = ["Alice", "Bob", "Carol", "Dan", "Erin", "Frank"];

struct Args {
    players: usize,
    rounds: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
    json: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig, Error> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            GameConfig::from_json(&raw)?
        }
        None => GameConfig::from_env()?,
    };
    Ok(config)
}

/// Buy what is affordable, pay every expense, donate on charity cards.
fn choose_action(deck: DeckType, affordable: bool) -> CardAction {
    match deck {
        DeckType::Opportunity if affordable => CardAction::Buy,
        DeckType::Opportunity => CardAction::Skip,
        DeckType::Expense => CardAction::Pay,
        DeckType::Charity if affordable => CardAction::Charity,
        DeckType::Charity => CardAction::Skip,
    }
}

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        players: pargs.opt_value_from_str("--players")?.unwrap_or(3),
        rounds: pargs.opt_value_from_str("--rounds")?.unwrap_or(20),
        seed: pargs.opt_value_from_str("--seed")?,
        config: pargs.opt_value_from_str("--config")?,
        json: pargs.contains("--json"),
    };
    if !(1..=NAMES.len()).contains(&args.players) {
        anyhow::bail!("--players must be between 1 and {}", NAMES.len());
    }

    env_logger::builder().format_target(false).init();

    let config = load_config(args.config.as_ref())?;
    let starting_balance = config.economy.starting_balance;

    let store = InMemoryPlayerManager::new().shared();
    let professions = Profession::catalog();
    for (i, name) in NAMES.iter().take(args.players).enumerate() {
        let profession = professions[i % professions.len()].clone();
        let player = Player::new(name.to_lowercase(), name, starting_balance)
            .with_profession(profession);
        store.borrow_mut().add_player(player)?;
    }

    let bus = EventBus::shared();
    bus.on(BusTopic::PlayerBankrupted, |event| {
        info!("Bus: {}", serde_json::to_string(event).unwrap_or_default());
    });

    let mut game = match args.seed {
        Some(seed) => EventOrchestrator::with_seed(config, store.clone(), bus.clone(), seed),
        None => EventOrchestrator::new(config, store.clone(), bus.clone()),
    };
    info!(
        "Simulating {} rounds with {} players",
        args.rounds, args.players
    );

    let ids: Vec<PlayerId> = store
        .borrow()
        .all_players()
        .into_iter()
        .map(|p| p.id)
        .collect();

    for round in 1..=args.rounds {
        for id in &ids {
            let report = game.play_turn(id, RollOptions::default())?;

            if let Some(drawn) = report.drawn_card() {
                let balance = store.borrow().get_player(id)?.balance;
                let action = choose_action(drawn.deck, balance >= drawn.card.amount);
                let card = drawn.card.clone();
                game.resolve_card(id, &card, action)?;
            }

            game.end_turn(id)?;
        }
        info!("Round {round} complete");
    }

    let players = store.borrow().all_players();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&players)?);
    } else {
        println!(
            "{:<8} {:>10} {:>8} {:>8} {:>6} {:>9} {:>8}",
            "PLAYER", "BALANCE", "INCOME", "ASSETS", "KIDS", "BANKRUPT", "TRACK"
        );
        for player in &players {
            println!(
                "{:<8} {:>10} {:>8} {:>8} {:>6} {:>9} {:>8}",
                player.name,
                player.balance,
                player.monthly_income,
                player.assets.len(),
                player.children,
                player.bankruptcy_count,
                player.position.track.to_string(),
            );
        }

        let stats = game.stats();
        println!();
        println!("{} events in history, {} failed", stats.total_events, stats.failures);
        for (kind, count) in &stats.by_kind {
            println!("  {:<10} {count}", kind.to_string());
        }
    }

    Ok(())
}
