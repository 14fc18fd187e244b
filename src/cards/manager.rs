//! Deck manager: owns the three decks and resolves card actions.

use super::{
    catalog,
    deck::Deck,
    errors::{CardError, CardResult},
    models::{
        Card, CardAction, CardOutcome, CardStats, DeckInfo, DeckType, DrawRecord, DrawnCard,
    },
};
use crate::{
    board::CellType,
    bus::{BusEvent, SharedBus},
    errors::ErrorCategory,
    history::History,
    players::{Money, Player, PlayerId, PlayerPatch, SharedPlayers},
};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;

/// Deck manager
pub struct DeckManager {
    decks: BTreeMap<DeckType, Deck>,
    rng: StdRng,
    current_card: Option<DrawnCard>,
    draws: History<DrawRecord>,
    processed: History<CardOutcome>,
    players: SharedPlayers,
    bus: SharedBus,
    destroyed: bool,
}

impl DeckManager {
    /// Create a manager with the default catalog, every deck shuffled
    pub fn new(history_capacity: usize, players: SharedPlayers, bus: SharedBus) -> Self {
        Self::with_rng(
            history_capacity,
            players,
            bus,
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    pub fn with_seed(
        history_capacity: usize,
        players: SharedPlayers,
        bus: SharedBus,
        seed: u64,
    ) -> Self {
        Self::with_rng(history_capacity, players, bus, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        history_capacity: usize,
        players: SharedPlayers,
        bus: SharedBus,
        mut rng: StdRng,
    ) -> Self {
        let decks = DeckType::ALL
            .into_iter()
            .map(|deck_type| {
                let mut deck = catalog::default_deck(deck_type);
                deck.shuffle(&mut rng);
                (deck_type, deck)
            })
            .collect();

        log::info!("Decks initialized");

        Self {
            decks,
            rng,
            current_card: None,
            draws: History::new(history_capacity),
            processed: History::new(history_capacity),
            players,
            bus,
            destroyed: false,
        }
    }

    /// Replace a deck with custom cards, left in the given order.
    #[must_use]
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.decks.insert(deck.deck_type(), deck);
        self
    }

    fn ensure_alive(&self) -> CardResult<()> {
        if self.destroyed {
            log::warn!("Deck manager destroyed, request rejected");
            return Err(CardError::Destroyed);
        }
        Ok(())
    }

    fn deck_mut(&mut self, deck_type: DeckType) -> CardResult<&mut Deck> {
        self.decks
            .get_mut(&deck_type)
            .ok_or_else(|| CardError::UnknownDeck(deck_type.to_string()))
    }

    /// Draw the next card, reshuffling an exhausted deck first
    pub fn draw(
        &mut self,
        deck_type: DeckType,
        player_id: Option<&PlayerId>,
    ) -> CardResult<DrawnCard> {
        self.ensure_alive()?;

        let deck = self
            .decks
            .get_mut(&deck_type)
            .ok_or_else(|| CardError::UnknownDeck(deck_type.to_string()))?;
        let (card, reshuffled) = deck
            .draw(&mut self.rng)
            .ok_or(CardError::EmptyDeck(deck_type))?;
        let shuffle_count = deck.shuffle_count();

        if reshuffled {
            log::info!("Deck {deck_type} exhausted, reshuffled");
            self.bus.emit(BusEvent::DeckShuffled {
                deck: deck_type,
                implicit: true,
                shuffle_count,
            });
        }

        let drawn = DrawnCard {
            card,
            deck: deck_type,
            reshuffled,
        };

        self.draws.push(DrawRecord {
            card: drawn.card.clone(),
            deck: deck_type,
            player_id: player_id.cloned(),
            reshuffled,
            drawn_at: Utc::now(),
        });
        self.current_card = Some(drawn.clone());

        log::info!("Drew {} from {deck_type}", drawn.card);

        self.bus.emit(BusEvent::CardDrawn {
            deck: deck_type,
            card: drawn.card.clone(),
            reshuffled,
        });

        Ok(drawn)
    }

    /// Draw by deck name
    pub fn draw_named(&mut self, deck: &str, player_id: Option<&PlayerId>) -> CardResult<DrawnCard> {
        let deck_type = deck.parse()?;
        self.draw(deck_type, player_id)
    }

    /// Draw from the deck matching a board cell, if the cell has one
    pub fn draw_for_cell(
        &mut self,
        cell_type: CellType,
        player_id: Option<&PlayerId>,
    ) -> CardResult<Option<DrawnCard>> {
        match cell_type.deck() {
            Some(deck_type) => self.draw(deck_type, player_id).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve an action on a card against a player's balance.
    ///
    /// Insufficient funds is a failed [`CardOutcome`], not an error.
    pub fn process_card(
        &mut self,
        card: &Card,
        action: CardAction,
        player_id: &PlayerId,
    ) -> CardResult<CardOutcome> {
        self.ensure_alive()?;

        let player = self.players.borrow().get_player(player_id)?;

        let affordable = player.balance >= card.amount;
        let (success, message, financial_impact) = match action {
            CardAction::Skip => (true, format!("Skipped {}", card.name), 0),
            _ if !affordable => (
                false,
                format!(
                    "Insufficient funds: {} needs ${}, balance ${}",
                    card.name, card.amount, player.balance
                ),
                0,
            ),
            CardAction::Buy => {
                self.buy(card, &player)?;
                (true, format!("Bought {} for ${}", card.name, card.amount), -card.amount)
            }
            CardAction::Pay => {
                self.pay(card, &player)?;
                (true, format!("Paid {} ${}", card.name, card.amount), -card.amount)
            }
            CardAction::Charity => {
                self.debit(&player.id, card.amount, &format!("Charity: {}", card.name))?;
                (true, format!("Donated ${} to {}", card.amount, card.name), -card.amount)
            }
        };

        let outcome = CardOutcome {
            card: card.clone(),
            action,
            player_id: player_id.clone(),
            success,
            message,
            financial_impact,
            category: (!success).then_some(ErrorCategory::InsufficientFunds),
            timestamp: Utc::now(),
        };

        if outcome.success {
            log::info!("{}: {}", player.name, outcome.message);
        } else {
            log::warn!("{}: {}", player.name, outcome.message);
        }

        self.processed.push(outcome.clone());
        self.bus.emit(BusEvent::CardProcessed {
            player_id: player_id.clone(),
            action,
            outcome: outcome.clone(),
        });

        Ok(outcome)
    }

    /// Resolve an action given by name
    pub fn process_named(
        &mut self,
        card: &Card,
        action: &str,
        player_id: &PlayerId,
    ) -> CardResult<CardOutcome> {
        let action = action.parse()?;
        self.process_card(card, action, player_id)
    }

    fn debit(&self, id: &PlayerId, amount: Money, reason: &str) -> CardResult<Money> {
        Ok(self.players.borrow_mut().update_balance(id, -amount, reason)?)
    }

    fn buy(&self, card: &Card, player: &Player) -> CardResult<()> {
        self.debit(&player.id, card.amount, &format!("Purchase: {}", card.name))?;

        if let Some(income) = card.income {
            let mut assets = player.assets.clone();
            assets.push(card.clone());
            self.players.borrow_mut().update_player(
                &player.id,
                PlayerPatch {
                    monthly_income: Some(player.monthly_income + income),
                    assets: Some(assets),
                    ..Default::default()
                },
            )?;
        }
        Ok(())
    }

    fn pay(&self, card: &Card, player: &Player) -> CardResult<()> {
        self.debit(&player.id, card.amount, &format!("Expense: {}", card.name))?;

        if let Some(expense) = card.monthly_expense {
            self.players.borrow_mut().update_player(
                &player.id,
                PlayerPatch {
                    monthly_expenses: Some(player.monthly_expenses + expense),
                    ..Default::default()
                },
            )?;
        }
        Ok(())
    }

    pub fn shuffle(&mut self, deck_type: DeckType) -> CardResult<()> {
        self.ensure_alive()?;

        let deck = self
            .decks
            .get_mut(&deck_type)
            .ok_or_else(|| CardError::UnknownDeck(deck_type.to_string()))?;
        deck.shuffle(&mut self.rng);
        let shuffle_count = deck.shuffle_count();

        log::debug!("Deck {deck_type} shuffled");
        self.bus.emit(BusEvent::DeckShuffled {
            deck: deck_type,
            implicit: false,
            shuffle_count,
        });
        Ok(())
    }

    pub fn shuffle_all(&mut self) -> CardResult<()> {
        for deck_type in DeckType::ALL {
            self.shuffle(deck_type)?;
        }
        Ok(())
    }

    /// Put a deck back in catalog order, unshuffled
    pub fn reset(&mut self, deck_type: DeckType) -> CardResult<()> {
        self.ensure_alive()?;
        self.deck_mut(deck_type)?.reset();
        Ok(())
    }

    pub fn deck_info(&self, deck_type: DeckType) -> CardResult<DeckInfo> {
        self.decks
            .get(&deck_type)
            .map(Deck::info)
            .ok_or_else(|| CardError::UnknownDeck(deck_type.to_string()))
    }

    pub fn current_card(&self) -> Option<&DrawnCard> {
        self.current_card.as_ref()
    }

    pub fn clear_current_card(&mut self) {
        self.current_card = None;
    }

    pub fn history(&self, limit: usize) -> Vec<DrawRecord> {
        self.draws.recent(limit).cloned().collect()
    }

    pub fn processed(&self, limit: usize) -> Vec<CardOutcome> {
        self.processed.recent(limit).cloned().collect()
    }

    pub fn stats(&self) -> CardStats {
        CardStats {
            total_decks: self.decks.len(),
            current_card: self.current_card.as_ref().map(|d| d.card.name.clone()),
            draws_recorded: self.draws.len(),
            processed_recorded: self.processed.len(),
            decks: self.decks.values().map(Deck::info).collect(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn destroy(&mut self) {
        self.decks.clear();
        self.draws.clear();
        self.processed.clear();
        self.current_card = None;
        self.destroyed = true;
        log::info!("Deck manager destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bus::{BusTopic, EventBus},
        players::{InMemoryPlayerManager, PlayerManager},
    };
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    fn setup(balance: Money) -> (DeckManager, Rc<RefCell<InMemoryPlayerManager>>, PlayerId) {
        let store = InMemoryPlayerManager::new().shared();
        store
            .borrow_mut()
            .add_player(Player::new("alice", "Alice", balance))
            .unwrap();
        let manager = DeckManager::with_seed(100, store.clone(), EventBus::shared(), 5);
        (manager, store, PlayerId::new("alice"))
    }

    fn stocks() -> Card {
        Card::new("opp_001", "Stocks", 5_000, "stock").with_income(500)
    }

    #[test]
    fn test_decks_start_shuffled() {
        let (manager, _, _) = setup(0);
        for deck in DeckType::ALL {
            let info = manager.deck_info(deck).unwrap();
            assert!(info.is_shuffled);
            assert_eq!(info.remaining, info.total);
        }
    }

    #[test]
    fn test_draw_named_unknown_deck() {
        let (mut manager, _, _) = setup(0);
        assert_eq!(
            manager.draw_named("lottery", None),
            Err(CardError::UnknownDeck("lottery".into()))
        );
        assert!(manager.draw_named("Expense", None).is_ok());
    }

    #[test]
    fn test_draw_for_cell() {
        let (mut manager, _, _) = setup(0);
        let drawn = manager.draw_for_cell(CellType::Opportunity, None).unwrap();
        assert_eq!(drawn.unwrap().deck, DeckType::Opportunity);
        assert!(manager.draw_for_cell(CellType::Payday, None).unwrap().is_none());
        assert_eq!(
            manager.current_card().map(|d| d.deck),
            Some(DeckType::Opportunity)
        );
    }

    #[test]
    fn test_buy_adds_income_and_asset() {
        let (mut manager, store, alice) = setup(10_000);
        let outcome = manager.process_card(&stocks(), CardAction::Buy, &alice).unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.financial_impact, -5_000);
        let player = store.borrow().get_player(&alice).unwrap();
        assert_eq!(player.balance, 5_000);
        assert_eq!(player.monthly_income, 500);
        assert_eq!(player.assets.len(), 1);
    }

    #[test]
    fn test_buy_insufficient_funds_no_mutation() {
        let (mut manager, store, alice) = setup(4_999);
        let outcome = manager.process_card(&stocks(), CardAction::Buy, &alice).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.financial_impact, 0);
        assert_eq!(outcome.category, Some(ErrorCategory::InsufficientFunds));
        let player = store.borrow().get_player(&alice).unwrap();
        assert_eq!(player.balance, 4_999);
        assert!(player.assets.is_empty());
    }

    #[test]
    fn test_pay_adds_recurring_expense() {
        let (mut manager, store, alice) = setup(3_000);
        let loan = Card::new("exp_x", "Car loan", 1_000, "loan").with_monthly_expense(200);
        let outcome = manager.process_card(&loan, CardAction::Pay, &alice).unwrap();

        assert!(outcome.success);
        let player = store.borrow().get_player(&alice).unwrap();
        assert_eq!(player.balance, 2_000);
        assert_eq!(player.monthly_expenses, 200);
    }

    #[test]
    fn test_charity_only_debits() {
        let (mut manager, store, alice) = setup(1_000);
        let card = catalog::charity_cards().remove(1);
        let outcome = manager.process_card(&card, CardAction::Charity, &alice).unwrap();

        assert!(outcome.success);
        let player = store.borrow().get_player(&alice).unwrap();
        assert_eq!(player.balance, 200);
        assert_eq!(player.monthly_income, 0);
    }

    #[test]
    fn test_skip_always_succeeds() {
        let (mut manager, store, alice) = setup(0);
        let outcome = manager.process_card(&stocks(), CardAction::Skip, &alice).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.financial_impact, 0);
        assert_eq!(store.borrow().get_player(&alice).unwrap().balance, 0);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let (mut manager, store, alice) = setup(10_000);
        let err = manager.process_named(&stocks(), "steal", &alice).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);
        assert_eq!(store.borrow().get_player(&alice).unwrap().balance, 10_000);
        assert!(manager.processed(10).is_empty());
    }

    #[test]
    fn test_missing_player() {
        let (mut manager, _, _) = setup(0);
        let err = manager
            .process_card(&stocks(), CardAction::Buy, &PlayerId::new("ghost"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_single_reshuffle_over_eleven_draws() {
        let (mut manager, _, _) = setup(0);
        let shuffles = Rc::new(Cell::new(0));
        let s = shuffles.clone();
        manager
            .bus
            .on(BusTopic::DeckShuffled, move |_| s.set(s.get() + 1));

        for i in 0..10 {
            let drawn = manager.draw(DeckType::Opportunity, None).unwrap();
            assert!(!drawn.reshuffled, "draw {i}");
        }
        assert_eq!(shuffles.get(), 0);

        let eleventh = manager.draw(DeckType::Opportunity, None).unwrap();
        assert!(eleventh.reshuffled);
        assert_eq!(shuffles.get(), 1);
    }

    #[test]
    fn test_custom_empty_deck() {
        let (manager, _, _) = setup(0);
        let mut manager = manager.with_deck(Deck::new(DeckType::Charity, Vec::new()));
        assert_eq!(
            manager.draw(DeckType::Charity, None),
            Err(CardError::EmptyDeck(DeckType::Charity))
        );
    }

    #[test]
    fn test_destroyed_rejects_draws() {
        let (mut manager, _, _) = setup(0);
        manager.destroy();
        assert_eq!(
            manager.draw(DeckType::Expense, None),
            Err(CardError::Destroyed)
        );
    }

    #[test]
    fn test_stats_and_history() {
        let (mut manager, _, alice) = setup(0);
        manager.draw(DeckType::Expense, Some(&alice)).unwrap();
        manager.draw(DeckType::Charity, Some(&alice)).unwrap();

        let stats = manager.stats();
        assert_eq!(stats.total_decks, 3);
        assert_eq!(stats.draws_recorded, 2);
        assert!(stats.current_card.is_some());

        let history = manager.history(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].deck, DeckType::Charity);

        manager.clear_current_card();
        assert!(manager.current_card().is_none());
    }
}
