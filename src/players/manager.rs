//! Player repository seam and its in-memory implementation.

use super::{
    errors::{PlayerError, PlayerResult},
    models::{BalanceEntry, EntryDirection, Money, Player, PlayerId, PlayerPatch},
};
use crate::board::BoardPosition;
use chrono::Utc;
use std::{cell::RefCell, rc::Rc};

/// Owner of player balances, assets and positions.
///
/// The engine treats every call as authoritative and synchronous. It never
/// computes a balance itself; it only submits deltas and patches.
pub trait PlayerManager {
    /// Snapshot of a player
    fn get_player(&self, id: &PlayerId) -> PlayerResult<Player>;

    /// Apply a signed delta and return the new balance
    fn update_balance(&mut self, id: &PlayerId, delta: Money, reason: &str) -> PlayerResult<Money>;

    fn update_player(&mut self, id: &PlayerId, patch: PlayerPatch) -> PlayerResult<()>;

    fn update_position(&mut self, id: &PlayerId, position: BoardPosition) -> PlayerResult<()>;

    /// Player whose turn it is
    fn get_current_player(&self) -> PlayerResult<Player>;

    fn add_player(&mut self, player: Player) -> PlayerResult<()>;

    /// All players in turn order
    fn all_players(&self) -> Vec<Player>;

    /// Advance the turn to the next active player and return them
    fn next_player(&mut self) -> PlayerResult<Player>;

    fn set_current_player(&mut self, id: &PlayerId) -> PlayerResult<()>;
}

/// Player manager handle shared by every component of one game
pub type SharedPlayers = Rc<RefCell<dyn PlayerManager>>;

/// In-process player store with a balance ledger
#[derive(Debug, Default)]
pub struct InMemoryPlayerManager {
    players: Vec<Player>,
    current_idx: usize,
    ledger: Vec<BalanceEntry>,
}

impl InMemoryPlayerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into the shared handle expected by the engine
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// Every balance movement, oldest first
    pub fn ledger(&self) -> &[BalanceEntry] {
        &self.ledger
    }

    pub fn ledger_for<'a>(&'a self, id: &'a PlayerId) -> impl Iterator<Item = &'a BalanceEntry> {
        self.ledger.iter().filter(move |entry| &entry.player_id == id)
    }

    /// Players still in the game
    pub fn active_players(&self) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.is_active && !p.is_bankrupt)
            .collect()
    }

    /// Bring a bankrupt player back with a fresh starting balance
    pub fn restore_player(&mut self, id: &PlayerId, starting_balance: Money) -> PlayerResult<()> {
        let player = self.find_mut(id)?;
        if !player.is_bankrupt {
            return Ok(());
        }

        player.is_bankrupt = false;
        player.balance = starting_balance;
        player.position = BoardPosition::start();
        player.updated_at = Utc::now();
        log::info!("Player {} restored after bankruptcy", player.name);
        Ok(())
    }

    fn find_mut(&mut self, id: &PlayerId) -> PlayerResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| PlayerError::NotFound(id.clone()))
    }
}

impl PlayerManager for InMemoryPlayerManager {
    fn get_player(&self, id: &PlayerId) -> PlayerResult<Player> {
        self.players
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| PlayerError::NotFound(id.clone()))
    }

    fn update_balance(&mut self, id: &PlayerId, delta: Money, reason: &str) -> PlayerResult<Money> {
        let player = self.find_mut(id)?;
        player.balance += delta;
        player.updated_at = Utc::now();
        let balance_after = player.balance;

        log::debug!("Balance of {id} changed by {delta} ({reason}), now {balance_after}");

        self.ledger.push(BalanceEntry {
            player_id: id.clone(),
            amount: delta,
            balance_after,
            direction: if delta < 0 {
                EntryDirection::Debit
            } else {
                EntryDirection::Credit
            },
            reason: reason.to_string(),
            created_at: Utc::now(),
        });

        Ok(balance_after)
    }

    fn update_player(&mut self, id: &PlayerId, patch: PlayerPatch) -> PlayerResult<()> {
        let player = self.find_mut(id)?;
        patch.apply(player);
        Ok(())
    }

    fn update_position(&mut self, id: &PlayerId, position: BoardPosition) -> PlayerResult<()> {
        let player = self.find_mut(id)?;
        player.position = position;
        player.updated_at = Utc::now();
        Ok(())
    }

    fn get_current_player(&self) -> PlayerResult<Player> {
        self.players
            .get(self.current_idx)
            .cloned()
            .ok_or(PlayerError::NoPlayers)
    }

    fn add_player(&mut self, player: Player) -> PlayerResult<()> {
        if self.players.iter().any(|p| p.id == player.id) {
            return Err(PlayerError::AlreadyExists(player.id));
        }

        log::info!("Player {} ({}) added", player.name, player.id);
        self.players.push(player);
        Ok(())
    }

    fn all_players(&self) -> Vec<Player> {
        self.players.clone()
    }

    fn next_player(&mut self) -> PlayerResult<Player> {
        if self.players.is_empty() {
            return Err(PlayerError::NoPlayers);
        }

        let n = self.players.len();
        for _ in 0..n {
            self.current_idx = (self.current_idx + 1) % n;
            if self.players[self.current_idx].is_active {
                break;
            }
        }

        self.get_current_player()
    }

    fn set_current_player(&mut self, id: &PlayerId) -> PlayerResult<()> {
        let idx = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| PlayerError::NotFound(id.clone()))?;
        self.current_idx = idx;
        Ok(())
    }
}
