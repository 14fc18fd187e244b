//! Full game simulation tests.
//!
//! Plays many seeded rounds with several players and checks the invariants
//! that must hold after every turn.

use money_energy::{
    BusTopic, CardAction, DeckType, EventBus, EventOrchestrator, GameConfig,
    InMemoryPlayerManager, Player, PlayerId, PlayerManager, Profession, RollOptions,
    config::BoardConfig,
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

const IDS: [&str; 4] = ["alice", "bob", "carol", "dan"];

type Store = Rc<RefCell<InMemoryPlayerManager>>;

fn new_game(seed: u64, config: GameConfig) -> (EventOrchestrator, Store) {
    let store = InMemoryPlayerManager::new().shared();
    let catalog = Profession::catalog();
    for (i, id) in IDS.iter().enumerate() {
        let player = Player::new(*id, id, config.economy.starting_balance)
            .with_profession(catalog[i].clone());
        store.borrow_mut().add_player(player).unwrap();
    }
    let game = EventOrchestrator::with_seed(config, store.clone(), EventBus::shared(), seed);
    (game, store)
}

fn play_round(game: &mut EventOrchestrator, store: &Store) {
    for id in IDS.map(PlayerId::new) {
        let report = game.play_turn(&id, RollOptions::default()).unwrap();
        assert!(report.outcomes.iter().all(|r| r.event.processed));

        if let Some(drawn) = report.drawn_card() {
            let balance = store.borrow().get_player(&id).unwrap().balance;
            let action = match drawn.deck {
                DeckType::Opportunity if balance >= drawn.card.amount => CardAction::Buy,
                DeckType::Expense => CardAction::Pay,
                _ => CardAction::Skip,
            };
            let card = drawn.card.clone();
            game.resolve_card(&id, &card, action).unwrap();
        }

        game.end_turn(&id).unwrap();
    }
}

#[test]
fn test_long_game_keeps_invariants() {
    let config = GameConfig {
        board: BoardConfig {
            baby_position: Some(9),
            ..BoardConfig::default()
        },
        ..GameConfig::default()
    };
    let (inner, outer) = (config.board.inner_track_cells, config.board.outer_track_cells);
    let max_children = config.economy.max_children;
    let (mut game, store) = new_game(2024, config);

    for _ in 0..60 {
        play_round(&mut game, &store);

        for player in store.borrow().all_players() {
            // Every overdraft is resolved by a bankruptcy within the turn
            assert!(player.balance >= 0, "{} at {}", player.name, player.balance);
            assert!(player.children <= max_children);
            let cells = if player.is_on_outer_track() { outer } else { inner };
            assert!(player.position.offset < cells);
            assert_eq!(game.board().player_position(&player.id), player.position);
        }
        assert!(game.queue_handle().is_empty());
    }

    let stats = game.stats();
    assert!(stats.total_events > 0);
    assert!(!stats.draining);
}

#[test]
fn test_same_seed_same_game() {
    let summary = |seed| {
        let (mut game, store) = new_game(seed, GameConfig::default());
        for _ in 0..25 {
            play_round(&mut game, &store);
        }
        store
            .borrow()
            .all_players()
            .into_iter()
            .map(|p| (p.balance, p.position, p.children, p.bankruptcy_count, p.assets.len()))
            .collect::<Vec<_>>()
    };

    assert_eq!(summary(77), summary(77));
}

#[test]
fn test_every_turn_announced() {
    let (mut game, store) = new_game(5, GameConfig::default());
    let turns = Rc::new(Cell::new(0));
    let counter = turns.clone();
    game.bus()
        .on(BusTopic::TurnCompleted, move |_| counter.set(counter.get() + 1));

    for _ in 0..10 {
        play_round(&mut game, &store);
    }

    assert_eq!(turns.get(), 10 * IDS.len());
    assert_eq!(game.dice().history(usize::MAX).len(), game.config().history.rolls.min(40));
}

#[test]
fn test_players_reach_outer_track() {
    let (mut game, store) = new_game(3, GameConfig::default());

    for _ in 0..80 {
        play_round(&mut game, &store);
    }

    assert!(
        store
            .borrow()
            .all_players()
            .iter()
            .any(Player::is_on_outer_track)
    );
}
