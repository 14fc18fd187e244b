//! Dice roller with an Idle -> Rolling -> Idle state machine.

use super::{
    errors::{DiceError, DiceResult},
    models::{DieValue, RollOptions, RollRecord, RollResult, RollState, RollStats},
};
use crate::{
    bus::{BusEvent, SharedBus},
    config::DiceConfig,
    history::History,
    players::PlayerId,
};
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashMap;

/// Roll the secondary six-sided die.
///
/// Always 1-6 regardless of the configured dice range.
pub fn roll_d6<R: Rng + ?Sized>(rng: &mut R) -> DieValue {
    rng.random_range(1..=6)
}

#[derive(Debug)]
struct PendingRoll {
    player_id: Option<PlayerId>,
    options: RollOptions,
}

/// Dice roller
pub struct DiceRoller {
    config: DiceConfig,
    rng: StdRng,
    state: RollState,
    pending: Option<PendingRoll>,
    values: [DieValue; 2],
    history: History<RollRecord>,
    bus: SharedBus,
    destroyed: bool,
}

impl DiceRoller {
    /// Create a roller seeded from the thread RNG
    pub fn new(config: DiceConfig, history_capacity: usize, bus: SharedBus) -> Self {
        Self::with_rng(
            config,
            history_capacity,
            bus,
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    /// Deterministic roller for replays and tests
    pub fn with_seed(config: DiceConfig, history_capacity: usize, bus: SharedBus, seed: u64) -> Self {
        Self::with_rng(config, history_capacity, bus, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: DiceConfig, history_capacity: usize, bus: SharedBus, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            state: RollState::Idle,
            pending: None,
            values: [0, 0],
            history: History::new(history_capacity),
            bus,
            destroyed: false,
        }
    }

    pub fn state(&self) -> RollState {
        self.state
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Roll both dice in one step
    pub fn roll(
        &mut self,
        player_id: Option<&PlayerId>,
        options: RollOptions,
    ) -> DiceResult<RollResult> {
        self.start_roll(player_id, options)?;
        self.finish_roll()
    }

    /// Enter the Rolling state. A front-end animates between this call and
    /// [`finish_roll`](Self::finish_roll).
    pub fn start_roll(
        &mut self,
        player_id: Option<&PlayerId>,
        options: RollOptions,
    ) -> DiceResult<()> {
        if self.destroyed {
            log::warn!("Dice roller destroyed, roll rejected");
            return Err(DiceError::Destroyed);
        }

        if self.state == RollState::Rolling {
            log::warn!("Dice already rolling, roll rejected");
            return Err(DiceError::AlreadyRolling);
        }

        let (min, max) = (self.config.min_value, self.config.max_value);
        if min > max {
            log::error!("Dice range {min}..={max} is empty, roll rejected");
            return Err(DiceError::InvalidRange { min, max });
        }

        self.state = RollState::Rolling;
        self.pending = Some(PendingRoll {
            player_id: player_id.cloned(),
            options,
        });

        self.bus.emit(BusEvent::DiceRollStarted {
            player_id: player_id.cloned(),
            options,
            at: Utc::now(),
        });

        Ok(())
    }

    /// Produce the result of the roll started by `start_roll`
    pub fn finish_roll(&mut self) -> DiceResult<RollResult> {
        if self.destroyed {
            return Err(DiceError::Destroyed);
        }

        let pending = self.pending.take().ok_or(DiceError::NotRolling)?;
        self.state = RollState::Idle;

        let die1 = self.die_value(&pending.options);
        let die2 = self.die_value(&pending.options);
        let result = RollResult::new([die1, die2], self.config.double_roll_bonus);

        self.values = result.values;
        self.history.push(RollRecord {
            result: result.clone(),
            player_id: pending.player_id.clone(),
        });

        log::info!("Dice rolled: {result}");

        self.bus.emit(BusEvent::DiceRolled {
            player_id: pending.player_id,
            result: result.clone(),
        });

        Ok(result)
    }

    fn die_value(&mut self, options: &RollOptions) -> DieValue {
        let (min, max) = (self.config.min_value, self.config.max_value);
        match options.fixed_value {
            Some(value) => self.clamp(value),
            None => self.rng.random_range(min..=max),
        }
    }

    fn clamp(&self, value: i64) -> DieValue {
        // max before min so an empty range cannot panic
        let clamped = value
            .max(i64::from(self.config.min_value))
            .min(i64::from(self.config.max_value));
        // In range of u8 after the clamp above.
        clamped as DieValue
    }

    /// Force the displayed values, clamped into range. Does not touch history.
    pub fn set_fixed_result(&mut self, values: [i64; 2]) {
        self.values = [self.clamp(values[0]), self.clamp(values[1])];
        log::debug!("Fixed dice result set to {:?}", self.values);
    }

    pub fn current_values(&self) -> [DieValue; 2] {
        self.values
    }

    pub fn current_total(&self) -> u16 {
        u16::from(self.values[0]) + u16::from(self.values[1])
    }

    /// Whether the last recorded roll grants another roll right now
    pub fn can_roll_again(&self) -> bool {
        self.state == RollState::Idle
            && self
                .history
                .last()
                .is_some_and(|record| record.result.can_roll_again)
    }

    /// Reset at the start of a turn
    pub fn reset(&mut self) {
        self.values = [0, 0];
        self.state = RollState::Idle;
        self.pending = None;
    }

    pub fn history(&self, limit: usize) -> Vec<RollRecord> {
        self.history.recent(limit).cloned().collect()
    }

    pub fn stats(&self) -> RollStats {
        if self.history.is_empty() {
            return RollStats::default();
        }

        let total_rolls = self.history.len();
        let doubles_count = self.history.iter().filter(|r| r.result.is_double).count();
        let sum: u64 = self.history.iter().map(|r| u64::from(r.result.total)).sum();
        let average = sum as f64 / total_rolls as f64;

        let mut counts: HashMap<u16, usize> = HashMap::new();
        for record in self.history.iter() {
            *counts.entry(record.result.total).or_default() += 1;
        }
        // Ties go to the higher total.
        let most_common_roll = counts
            .into_iter()
            .max_by_key(|&(total, count)| (count, total))
            .map(|(total, _)| total);

        RollStats {
            total_rolls,
            average_roll: (average * 100.0).round() / 100.0,
            doubles_count,
            doubles_percentage: ((doubles_count as f64 / total_rolls as f64) * 100.0).round()
                as u32,
            most_common_roll,
        }
    }

    /// Clear state and reject every later call
    pub fn destroy(&mut self) {
        self.reset();
        self.history.clear();
        self.destroyed = true;
        log::info!("Dice roller destroyed");
    }
}
