//! Event orchestrator: owns the game components and drains the event queue.

use super::{
    errors::{EventError, EventResult},
    handlers::{
        BabyBornEvent, BankruptcyEvent, CardDrawEvent, CharityEvent, EventHandler, GameEventKind,
        HandlerContext, MovementEvent, PaydayEvent,
    },
    models::{
        BankruptcyReason, EventKind, EventOutcome, EventRecord, EventStats, GameEvent,
        OrchestratorState, TurnReport,
    },
    queue::QueueHandle,
};
use crate::{
    board::{Board, MoveState},
    bus::{BusEvent, SharedBus},
    cards::{Card, CardAction, CardOutcome, DeckManager, DeckType},
    config::GameConfig,
    dice::{DiceRoller, RollOptions, RollState},
    errors::ErrorCategory,
    history::History,
    players::{PlayerId, SharedPlayers},
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::{BTreeMap, HashSet},
    panic::{AssertUnwindSafe, catch_unwind},
};
use uuid::Uuid;

/// Coordinates dice, decks and board through a FIFO event queue.
///
/// Events queued while a drain pass is running (by handlers or by bus
/// listeners) are appended to the same queue and processed later in that
/// pass. Handlers never run recursively.
pub struct EventOrchestrator {
    config: GameConfig,
    players: SharedPlayers,
    bus: SharedBus,
    dice: DiceRoller,
    deck: DeckManager,
    board: Board,
    rng: StdRng,
    queue: QueueHandle,
    draining: bool,
    bankrupted_in_pass: HashSet<PlayerId>,
    history: History<EventRecord>,
    destroyed: bool,
}

impl EventOrchestrator {
    pub fn new(config: GameConfig, players: SharedPlayers, bus: SharedBus) -> Self {
        let dice = DiceRoller::new(config.dice.clone(), config.history.rolls, bus.clone());
        let deck = DeckManager::new(config.history.draws, players.clone(), bus.clone());
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::assemble(config, players, bus, dice, deck, rng)
    }

    /// Fully deterministic orchestrator; every component derives its RNG
    /// from `seed`.
    pub fn with_seed(config: GameConfig, players: SharedPlayers, bus: SharedBus, seed: u64) -> Self {
        let dice =
            DiceRoller::with_seed(config.dice.clone(), config.history.rolls, bus.clone(), seed);
        let deck = DeckManager::with_seed(
            config.history.draws,
            players.clone(),
            bus.clone(),
            seed.wrapping_add(1),
        );
        let rng = StdRng::seed_from_u64(seed.wrapping_add(2));
        Self::assemble(config, players, bus, dice, deck, rng)
    }

    fn assemble(
        config: GameConfig,
        players: SharedPlayers,
        bus: SharedBus,
        dice: DiceRoller,
        deck: DeckManager,
        rng: StdRng,
    ) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("Game configuration is invalid, affected operations will fail: {err}");
        }

        let board = Board::new(
            config.board.clone(),
            config.history.moves,
            players.clone(),
            bus.clone(),
        );

        let mut orchestrator = Self {
            queue: QueueHandle::new(bus.clone()),
            history: History::new(config.history.events),
            config,
            players,
            bus,
            dice,
            deck,
            board,
            rng,
            draining: false,
            bankrupted_in_pass: HashSet::new(),
            destroyed: false,
        };

        let ids: Vec<PlayerId> = orchestrator
            .players
            .borrow()
            .all_players()
            .into_iter()
            .map(|p| p.id)
            .collect();
        for id in &ids {
            orchestrator.board.register_player(id);
        }

        log::info!("Event orchestrator ready with {} players", ids.len());
        orchestrator
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn players(&self) -> &SharedPlayers {
        &self.players
    }

    pub fn dice(&self) -> &DiceRoller {
        &self.dice
    }

    pub fn dice_mut(&mut self) -> &mut DiceRoller {
        &mut self.dice
    }

    pub fn deck(&self) -> &DeckManager {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut DeckManager {
        &mut self.deck
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Handle for queueing events from bus listeners
    pub fn queue_handle(&self) -> QueueHandle {
        self.queue.clone()
    }

    pub fn state(&self) -> OrchestratorState {
        if self.draining {
            OrchestratorState::Draining
        } else {
            OrchestratorState::Idle
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> EventResult<()> {
        if self.destroyed {
            log::warn!("Event orchestrator destroyed, request rejected");
            return Err(EventError::Destroyed);
        }
        Ok(())
    }

    /// Queue an event and drain the queue unless a drain is already running
    pub fn queue_event(
        &mut self,
        player_id: &PlayerId,
        kind: impl Into<GameEventKind>,
    ) -> EventResult<Uuid> {
        self.ensure_alive()?;
        let id = self.queue.push(player_id, kind)?;
        if !self.draining {
            self.drain();
        }
        Ok(id)
    }

    pub fn queue_payday(&mut self, player_id: &PlayerId) -> EventResult<Uuid> {
        self.queue_event(player_id, PaydayEvent)
    }

    pub fn queue_charity(&mut self, player_id: &PlayerId) -> EventResult<Uuid> {
        self.queue_event(player_id, CharityEvent)
    }

    pub fn queue_bankruptcy(
        &mut self,
        player_id: &PlayerId,
        reason: BankruptcyReason,
    ) -> EventResult<Uuid> {
        self.queue_event(player_id, BankruptcyEvent::new(reason))
    }

    pub fn queue_baby_born(&mut self, player_id: &PlayerId) -> EventResult<Uuid> {
        self.queue_event(player_id, BabyBornEvent::default())
    }

    pub fn queue_card_draw(&mut self, player_id: &PlayerId, deck: DeckType) -> EventResult<Uuid> {
        self.queue_event(player_id, CardDrawEvent { deck })
    }

    pub fn queue_movement(&mut self, player_id: &PlayerId, steps: usize) -> EventResult<Uuid> {
        self.queue_event(player_id, MovementEvent { steps })
    }

    /// Process queued events in FIFO order until the queue is empty.
    ///
    /// Returns the records of this pass. A second call while draining is a
    /// no-op returning nothing.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        if self.draining || self.destroyed {
            return Vec::new();
        }

        self.draining = true;
        self.bankrupted_in_pass.clear();

        let mut records = Vec::new();
        while let Some(event) = self.queue.pop() {
            let record = self.process(event);
            self.history.push(record.clone());
            self.bus.emit(BusEvent::EventProcessed {
                record: record.clone(),
            });
            records.push(record);
        }

        self.draining = false;
        if !records.is_empty() {
            log::debug!("Drain pass processed {} events", records.len());
        }
        records
    }

    fn process(&mut self, mut event: GameEvent) -> EventRecord {
        let kind = event.kind.clone();
        let player_id = event.player_id.clone();

        let mut ctx = HandlerContext {
            players: &self.players,
            deck: &mut self.deck,
            board: &mut self.board,
            economy: &self.config.economy,
            rng: &mut self.rng,
            queue: &self.queue,
            bus: &self.bus,
            bankrupted: &mut self.bankrupted_in_pass,
        };

        let outcome = match catch_unwind(AssertUnwindSafe(|| kind.handle(&player_id, &mut ctx))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                log::error!("{} event {} for {player_id} failed: {err}", kind.kind(), event.id);
                EventOutcome::failure(err.to_string(), err.category())
            }
            Err(_) => {
                log::error!("{} handler panicked on event {}", kind.kind(), event.id);
                EventOutcome::failure(
                    format!("{} handler panicked", kind.kind()),
                    ErrorCategory::InternalFailure,
                )
            }
        };

        event.processed = true;
        EventRecord {
            event,
            outcome,
            processed_at: Utc::now(),
        }
    }

    /// Apply a player's decision on a drawn card.
    ///
    /// A successful debit that leaves the balance negative queues a
    /// bankruptcy.
    pub fn resolve_card(
        &mut self,
        player_id: &PlayerId,
        card: &Card,
        action: CardAction,
    ) -> EventResult<CardOutcome> {
        self.ensure_alive()?;

        let outcome = self.deck.process_card(card, action, player_id)?;
        if outcome.success && outcome.financial_impact != 0 {
            let balance = self.players.borrow().get_player(player_id)?.balance;
            if balance < 0 {
                self.queue_bankruptcy(player_id, BankruptcyReason::InsufficientFundsAfterCard)?;
            }
        }
        Ok(outcome)
    }

    /// Roll, move and resolve every resulting event for one player.
    pub fn play_turn(
        &mut self,
        player_id: &PlayerId,
        options: RollOptions,
    ) -> EventResult<TurnReport> {
        self.ensure_alive()?;

        if self.dice.state() == RollState::Rolling || self.board.state() == MoveState::Moving {
            log::warn!("Turn for {player_id} rejected, a turn is in progress");
            return Err(EventError::TurnInProgress);
        }

        self.players.borrow().get_player(player_id)?;
        self.board.register_player(player_id);

        let roll = self.dice.roll(Some(player_id), options)?;
        self.queue.push(
            player_id,
            MovementEvent {
                steps: usize::from(roll.total),
            },
        )?;
        let outcomes = self.drain();

        let report = TurnReport {
            player_id: player_id.clone(),
            roll,
            outcomes,
        };

        log::info!(
            "Turn for {player_id}: rolled {}, {} events",
            report.roll.total,
            report.outcomes.len()
        );
        self.bus.emit(BusEvent::TurnCompleted {
            player_id: player_id.clone(),
            report: report.clone(),
        });

        Ok(report)
    }

    /// Reset per-turn state, keeping only the ending player's pending
    /// events.
    ///
    /// Returns how many events of other players were discarded.
    pub fn end_turn(&mut self, player_id: &PlayerId) -> EventResult<usize> {
        self.ensure_alive()?;

        let dropped = self.queue.retain(|event| &event.player_id == player_id);
        self.dice.reset();
        self.deck.clear_current_card();
        if dropped > 0 {
            log::debug!("Turn of {player_id} ended, dropped {dropped} events of other players");
        }
        Ok(dropped)
    }

    pub fn history(&self, limit: usize) -> Vec<EventRecord> {
        self.history.recent(limit).cloned().collect()
    }

    pub fn stats(&self) -> EventStats {
        let mut by_kind: BTreeMap<EventKind, usize> = BTreeMap::new();
        let mut failures = 0;
        for record in self.history.iter() {
            *by_kind.entry(record.kind()).or_default() += 1;
            if !record.outcome.success {
                failures += 1;
            }
        }

        EventStats {
            total_events: self.history.len(),
            by_kind,
            failures,
            queue_length: self.queue.len(),
            draining: self.draining,
        }
    }

    /// Close the queue and tear down every component
    pub fn destroy(&mut self) {
        self.queue.close();
        self.history.clear();
        self.bankrupted_in_pass.clear();
        self.dice.destroy();
        self.deck.destroy();
        self.board.destroy();
        self.destroyed = true;
        log::info!("Event orchestrator destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        board::{BoardPosition, Track},
        bus::{BusTopic, EventBus},
        events::models::OutcomeDetails,
        players::{InMemoryPlayerManager, Player, PlayerManager, PlayerPatch, Profession},
    };
    use std::{cell::RefCell, rc::Rc};

    fn game(players: Vec<Player>) -> (EventOrchestrator, Rc<RefCell<InMemoryPlayerManager>>) {
        let store = InMemoryPlayerManager::new().shared();
        for player in players {
            store.borrow_mut().add_player(player).unwrap();
        }
        let orchestrator =
            EventOrchestrator::with_seed(GameConfig::default(), store.clone(), EventBus::shared(), 7);
        (orchestrator, store)
    }

    fn alice() -> Player {
        Player::new("alice", "Alice", 10_000)
            .with_profession(Profession::new("dev", "Developer", 2_000, 0))
    }

    fn balance(store: &Rc<RefCell<InMemoryPlayerManager>>, id: &PlayerId) -> i64 {
        store.borrow().get_player(id).unwrap().balance
    }

    #[test]
    fn test_payday_credits_salary_and_passive_minus_interest() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        store
            .borrow_mut()
            .update_player(
                &id,
                PlayerPatch {
                    passive_income: Some(500),
                    credit_amount: Some(1_000),
                    ..Default::default()
                },
            )
            .unwrap();

        game.queue_payday(&id).unwrap();

        assert_eq!(balance(&store, &id), 10_000 + 2_500 - 100);
        let record = game.history(1).pop().unwrap();
        assert!(record.outcome.success);
        assert!(store.borrow().get_player(&id).unwrap().last_payday.is_some());
    }

    #[test]
    fn test_payday_expenses_can_bankrupt() {
        let player = Player::new("bob", "Bob", 0)
            .with_profession(Profession::new("x", "X", 1_000, 3_000));
        let (mut game, store) = game(vec![player]);
        let id = PlayerId::new("bob");

        game.queue_payday(&id).unwrap();

        let bob = store.borrow().get_player(&id).unwrap();
        assert!(bob.is_bankrupt);
        assert_eq!(bob.balance, 0);
        assert_eq!(bob.bankruptcy_count, 1);
        let kinds: Vec<EventKind> = game.history(10).iter().map(EventRecord::kind).collect();
        assert_eq!(kinds, vec![EventKind::Payday, EventKind::Bankruptcy]);
    }

    #[test]
    fn test_duplicate_bankruptcy_in_one_pass_suppressed() {
        let player = Player::new("bob", "Bob", 0)
            .with_profession(Profession::new("x", "X", 100, 5_000));
        let (mut game, store) = game(vec![player]);
        let id = PlayerId::new("bob");
        store
            .borrow_mut()
            .update_player(
                &id,
                PlayerPatch {
                    credit_amount: Some(10_000),
                    ..Default::default()
                },
            )
            .unwrap();

        game.queue_payday(&id).unwrap();

        let records = game.history(10);
        let suppressed: Vec<bool> = records
            .iter()
            .filter_map(|r| match r.outcome.details {
                OutcomeDetails::Bankruptcy { suppressed, .. } => Some(suppressed),
                _ => None,
            })
            .collect();
        assert_eq!(suppressed, vec![false, true]);
        assert_eq!(store.borrow().get_player(&id).unwrap().bankruptcy_count, 1);
    }

    #[test]
    fn test_charity_insufficient_funds_leaves_balance() {
        let player = Player::new("carol", "Carol", 50)
            .with_profession(Profession::new("x", "X", 5_000, 0));
        let (mut game, store) = game(vec![player]);
        let id = PlayerId::new("carol");

        game.queue_charity(&id).unwrap();

        let record = game.history(1).pop().unwrap();
        assert!(!record.outcome.success);
        assert_eq!(record.outcome.category, Some(ErrorCategory::InsufficientFunds));
        assert_eq!(balance(&store, &id), 50);
    }

    #[test]
    fn test_charity_without_income_succeeds() {
        let (mut game, store) = game(vec![Player::new("dan", "Dan", 1_000)]);
        let id = PlayerId::new("dan");

        game.queue_charity(&id).unwrap();

        assert!(game.history(1)[0].outcome.success);
        assert_eq!(balance(&store, &id), 1_000);
    }

    #[test]
    fn test_baby_born_fixed_roll() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");

        game.queue_event(&id, BabyBornEvent::fixed(2)).unwrap();
        game.queue_event(&id, BabyBornEvent::fixed(6)).unwrap();

        let alice = store.borrow().get_player(&id).unwrap();
        assert_eq!(alice.children, 1);
        assert_eq!(alice.balance, 15_000);
    }

    #[test]
    fn test_baby_born_capped() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        store
            .borrow_mut()
            .update_player(
                &id,
                PlayerPatch {
                    children: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();

        game.queue_event(&id, BabyBornEvent::fixed(1)).unwrap();

        let record = game.history(1).pop().unwrap();
        assert!(record.outcome.success);
        assert!(matches!(
            record.outcome.details,
            OutcomeDetails::BabyBorn {
                baby_born: false,
                ..
            }
        ));
        assert_eq!(balance(&store, &id), 10_000);
    }

    #[test]
    fn test_unknown_player_fails_without_panicking() {
        let (mut game, _) = game(vec![]);
        game.queue_payday(&PlayerId::new("ghost")).unwrap();

        let record = game.history(1).pop().unwrap();
        assert!(!record.outcome.success);
        assert_eq!(record.outcome.category, Some(ErrorCategory::NotFound));
    }

    #[test]
    fn test_listener_can_queue_during_drain() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        let queue = game.queue_handle();
        let target = id.clone();
        game.bus().once(BusTopic::BabyBorn, move |_| {
            queue.push(&target, CharityEvent).unwrap();
        });

        game.queue_event(&id, BabyBornEvent::fixed(3)).unwrap();

        let kinds: Vec<EventKind> = game.history(10).iter().map(EventRecord::kind).collect();
        assert_eq!(kinds, vec![EventKind::BabyBorn, EventKind::Charity]);
        assert!(game.queue_handle().is_empty());
        assert!(store.borrow().get_player(&id).unwrap().last_charity.is_some());
    }

    #[test]
    fn test_play_turn_moves_and_cascades() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");

        // 2 + 2 lands on inner offset 4, an expense cell
        let report = game.play_turn(&id, RollOptions::fixed(2)).unwrap();

        assert_eq!(report.roll.total, 4);
        assert_eq!(report.outcomes[0].kind(), EventKind::Movement);
        let position = store.borrow().get_player(&id).unwrap().position;
        assert_eq!(position, BoardPosition::new(Track::Inner, 4));
        assert_eq!(game.board().player_position(&id), position);
        assert_eq!(report.outcomes[1].kind(), EventKind::CardDraw);
        assert_eq!(report.drawn_card().unwrap().deck, DeckType::Expense);
        assert!(report.outcomes.iter().all(|r| r.event.processed));
    }

    #[test]
    fn test_panicking_handler_recorded_and_drain_continues() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        game.bus()
            .once(BusTopic::PlayerMoved, |_| panic!("listener failure"));
        let queue = game.queue_handle();
        queue.push(&id, MovementEvent { steps: 3 }).unwrap();
        queue.push(&id, MovementEvent { steps: 2 }).unwrap();

        let records = game.drain();

        assert_eq!(records.len(), 2);
        let failed = &records[0];
        assert!(failed.event.processed);
        assert!(!failed.outcome.success);
        assert_eq!(failed.outcome.category, Some(ErrorCategory::InternalFailure));
        assert_eq!(failed.outcome.message, "movement handler panicked");

        let next = &records[1];
        assert!(next.event.processed);
        assert!(next.outcome.success);
        assert_eq!(game.board().state(), MoveState::Idle);
        assert_eq!(
            store.borrow().get_player(&id).unwrap().position,
            BoardPosition::new(Track::Inner, 5)
        );
        assert!(game.queue_handle().is_empty());
        assert!(!game.stats().draining);
    }

    #[test]
    fn test_invalid_dice_range_fails_turn_cleanly() {
        let store = InMemoryPlayerManager::new().shared();
        store.borrow_mut().add_player(alice()).unwrap();
        let mut config = GameConfig::default();
        config.dice.min_value = 6;
        config.dice.max_value = 1;
        let mut game = EventOrchestrator::with_seed(config, store, EventBus::shared(), 3);
        let id = PlayerId::new("alice");

        for _ in 0..2 {
            let err = game.play_turn(&id, RollOptions::default()).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::ValidationFailure);
        }
        assert_eq!(game.dice().state(), RollState::Idle);
    }

    #[test]
    fn test_play_turn_rejected_mid_move() {
        let (mut game, _) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        game.board_mut().begin_move(&id, 1).unwrap();

        let err = game.play_turn(&id, RollOptions::default()).unwrap_err();
        assert_eq!(err, EventError::TurnInProgress);
    }

    #[test]
    fn test_resolve_card_never_overdraws() {
        let (mut game, store) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        let card = Card::new("c", "Costly", 10_000, "test");

        // Pay leaves exactly zero, no bankruptcy
        let outcome = game.resolve_card(&id, &card, CardAction::Pay).unwrap();
        assert!(outcome.success);
        assert!(!store.borrow().get_player(&id).unwrap().is_bankrupt);

        let outcome = game.resolve_card(&id, &card, CardAction::Pay).unwrap();
        assert!(!outcome.success);
        assert!(!store.borrow().get_player(&id).unwrap().is_bankrupt);
    }

    #[test]
    fn test_end_turn_keeps_only_that_players_events() {
        let (mut game, _) = game(vec![alice(), Player::new("bob", "Bob", 100)]);
        let alice_id = PlayerId::new("alice");
        let bob_id = PlayerId::new("bob");
        let queue = game.queue_handle();
        queue.push(&alice_id, PaydayEvent).unwrap();
        queue.push(&bob_id, PaydayEvent).unwrap();
        queue.push(&alice_id, CharityEvent).unwrap();

        assert_eq!(game.end_turn(&alice_id).unwrap(), 1);
        let pending = queue.pending();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|event| event.player_id == alice_id));
    }

    #[test]
    fn test_stats_count_by_kind() {
        let (mut game, _) = game(vec![alice()]);
        let id = PlayerId::new("alice");
        game.queue_payday(&id).unwrap();
        game.queue_payday(&id).unwrap();
        game.queue_charity(&id).unwrap();

        let stats = game.stats();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.by_kind[&EventKind::Payday], 2);
        assert_eq!(stats.by_kind[&EventKind::Charity], 1);
        assert_eq!(stats.failures, 0);
        assert!(!stats.draining);
    }

    #[test]
    fn test_destroy_rejects_new_events() {
        let (mut game, _) = game(vec![alice()]);
        game.destroy();

        let id = PlayerId::new("alice");
        let err = game.queue_payday(&id).unwrap_err();
        assert_eq!(err, EventError::Destroyed);
        assert_eq!(game.end_turn(&id), Err(EventError::Destroyed));
        assert!(game.board().is_destroyed());
        assert!(game.dice().is_destroyed());
        assert!(game.deck().is_destroyed());
    }
}
