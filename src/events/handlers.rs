//! Per-kind event handlers, dispatched through [`GameEventKind`].

use super::{
    errors::EventResult,
    models::{BankruptcyReason, EventKind, EventOutcome, OutcomeDetails},
    queue::QueueHandle,
};
use crate::{
    board::{Board, BoardPosition, CellType},
    bus::{BusEvent, SharedBus},
    cards::{DeckManager, DeckType},
    config::EconomyConfig,
    dice::roll_d6,
    errors::ErrorCategory,
    players::{Money, Player, PlayerId, PlayerPatch, SharedPlayers},
};
use chrono::Utc;
use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// `percent`% of `amount`, rounded half up
pub fn percent_of(amount: Money, percent: u32) -> Money {
    (amount * Money::from(percent) + 50).div_euclid(100)
}

/// Collaborators a handler may touch while resolving one event
pub struct HandlerContext<'a> {
    pub players: &'a SharedPlayers,
    pub deck: &'a mut DeckManager,
    pub board: &'a mut Board,
    pub economy: &'a EconomyConfig,
    pub rng: &'a mut StdRng,
    pub queue: &'a QueueHandle,
    pub bus: &'a SharedBus,
    /// Players bankrupted earlier in the current drain pass
    pub bankrupted: &'a mut HashSet<PlayerId>,
}

impl HandlerContext<'_> {
    fn player(&self, id: &PlayerId) -> EventResult<Player> {
        Ok(self.players.borrow().get_player(id)?)
    }

    fn adjust_balance(&self, id: &PlayerId, delta: Money, reason: &str) -> EventResult<Money> {
        Ok(self.players.borrow_mut().update_balance(id, delta, reason)?)
    }

    fn patch(&self, id: &PlayerId, patch: PlayerPatch) -> EventResult<()> {
        Ok(self.players.borrow_mut().update_player(id, patch)?)
    }

    /// Append a follow-up event to the queue being drained
    fn cascade(&self, id: &PlayerId, kind: impl Into<GameEventKind>) -> EventResult<()> {
        self.queue.push(id, kind)?;
        Ok(())
    }
}

/// Resolves one kind of game event
#[enum_dispatch]
pub trait EventHandler {
    fn kind(&self) -> EventKind;

    fn handle(&self, player_id: &PlayerId, ctx: &mut HandlerContext<'_>)
    -> EventResult<EventOutcome>;
}

/// Event payload, one variant per kind
#[enum_dispatch(EventHandler)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameEventKind {
    Payday(PaydayEvent),
    Charity(CharityEvent),
    Bankruptcy(BankruptcyEvent),
    CardDraw(CardDrawEvent),
    Movement(MovementEvent),
    BabyBorn(BabyBornEvent),
}

/// Salary in, credit interest and expenses out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaydayEvent;

impl EventHandler for PaydayEvent {
    fn kind(&self) -> EventKind {
        EventKind::Payday
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let player = ctx.player(player_id)?;

        let salary = player.salary();
        let passive_income = player.passive_income;
        let income = salary + passive_income;
        let mut balance = ctx.adjust_balance(player_id, income, "PAYDAY salary")?;

        let mut credit_interest = 0;
        if player.credit_amount > 0 {
            credit_interest =
                percent_of(player.credit_amount, ctx.economy.credit_interest_percent);
            balance = ctx.adjust_balance(player_id, -credit_interest, "Credit interest")?;
            if balance < 0 {
                ctx.cascade(
                    player_id,
                    BankruptcyEvent::new(BankruptcyReason::InsufficientFundsAfterCreditPayment),
                )?;
            }
        }

        let child_expenses = Money::from(player.children) * ctx.economy.child_expense;
        let expenses = player.base_expenses() + child_expenses;
        if expenses > 0 {
            balance = ctx.adjust_balance(player_id, -expenses, "PAYDAY expenses")?;
            // Independent of the credit check; both may fire.
            if balance < 0 {
                ctx.cascade(
                    player_id,
                    BankruptcyEvent::new(BankruptcyReason::InsufficientFundsAfterExpenses),
                )?;
            }
        }

        ctx.patch(
            player_id,
            PlayerPatch {
                last_payday: Some(Utc::now()),
                ..Default::default()
            },
        )?;

        log::info!(
            "PAYDAY for {}: +${income} (salary ${salary}, passive ${passive_income}), -${credit_interest} interest, -${expenses} expenses",
            player.name
        );

        Ok(EventOutcome::success(
            format!("PAYDAY: +${income}"),
            OutcomeDetails::Payday {
                income,
                salary,
                passive_income,
                credit_interest,
                expenses,
                child_expenses,
                balance,
            },
        ))
    }
}

/// Donate a share of monthly income
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharityEvent;

impl EventHandler for CharityEvent {
    fn kind(&self) -> EventKind {
        EventKind::Charity
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let player = ctx.player(player_id)?;
        let amount = percent_of(player.monthly_income, ctx.economy.charity_percent);

        if amount <= 0 {
            return Ok(EventOutcome::success(
                "No income to donate",
                OutcomeDetails::Charity { amount: 0 },
            ));
        }

        if player.balance < amount {
            log::warn!(
                "{} cannot afford charity of ${amount} (balance ${})",
                player.name,
                player.balance
            );
            return Ok(EventOutcome::failure(
                format!("Insufficient funds for charity, ${amount} needed"),
                ErrorCategory::InsufficientFunds,
            ));
        }

        ctx.adjust_balance(player_id, -amount, "Charity")?;
        ctx.patch(
            player_id,
            PlayerPatch {
                last_charity: Some(Utc::now()),
                ..Default::default()
            },
        )?;

        log::info!("{} donated ${amount} to charity", player.name);

        Ok(EventOutcome::success(
            format!("Charity: -${amount}"),
            OutcomeDetails::Charity { amount },
        ))
    }
}

/// Reset a player after running out of money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankruptcyEvent {
    pub reason: BankruptcyReason,
}

impl BankruptcyEvent {
    pub fn new(reason: BankruptcyReason) -> Self {
        Self { reason }
    }
}

impl EventHandler for BankruptcyEvent {
    fn kind(&self) -> EventKind {
        EventKind::Bankruptcy
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let player = ctx.player(player_id)?;

        if !ctx.bankrupted.insert(player_id.clone()) {
            log::debug!(
                "Duplicate bankruptcy for {} ({}) suppressed",
                player.name,
                self.reason
            );
            return Ok(EventOutcome::success(
                format!("{} is already bankrupt", player.name),
                OutcomeDetails::Bankruptcy {
                    reason: self.reason,
                    bankruptcy_count: player.bankruptcy_count,
                    suppressed: true,
                },
            ));
        }

        let bankruptcy_count = player.bankruptcy_count + 1;
        ctx.patch(
            player_id,
            PlayerPatch {
                balance: Some(0),
                credit_amount: Some(0),
                assets: Some(Vec::new()),
                passive_income: Some(0),
                is_bankrupt: Some(true),
                bankruptcy_count: Some(bankruptcy_count),
                ..Default::default()
            },
        )?;
        ctx.board
            .set_player_position(player_id, BoardPosition::start())?;

        log::info!(
            "{} went bankrupt ({}), bankruptcy #{bankruptcy_count}",
            player.name,
            self.reason
        );

        ctx.bus.emit(BusEvent::PlayerBankrupted {
            player_id: player_id.clone(),
            reason: self.reason,
            bankruptcy_count,
        });

        Ok(EventOutcome::success(
            format!("{} went bankrupt", player.name),
            OutcomeDetails::Bankruptcy {
                reason: self.reason,
                bankruptcy_count,
                suppressed: false,
            },
        ))
    }
}

/// Draw from a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDrawEvent {
    pub deck: DeckType,
}

impl EventHandler for CardDrawEvent {
    fn kind(&self) -> EventKind {
        EventKind::CardDraw
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let drawn = ctx.deck.draw(self.deck, Some(player_id))?;
        Ok(EventOutcome::success(
            format!("Drew {}", drawn.card.name),
            OutcomeDetails::CardDraw { drawn },
        ))
    }
}

/// Move a token, then queue whatever the landing cell triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEvent {
    pub steps: usize,
}

impl EventHandler for MovementEvent {
    fn kind(&self) -> EventKind {
        EventKind::Movement
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let outcome = ctx.board.move_player(player_id, self.steps)?;

        match outcome.cell.cell_type {
            CellType::Payday => ctx.cascade(player_id, PaydayEvent)?,
            CellType::Charity => ctx.cascade(player_id, CharityEvent)?,
            CellType::Opportunity => ctx.cascade(
                player_id,
                CardDrawEvent {
                    deck: DeckType::Opportunity,
                },
            )?,
            CellType::Expense => ctx.cascade(
                player_id,
                CardDrawEvent {
                    deck: DeckType::Expense,
                },
            )?,
            CellType::Baby => ctx.cascade(player_id, BabyBornEvent::default())?,
            CellType::Neutral => {}
        }

        Ok(EventOutcome::success(
            format!("Moved to {}", outcome.cell.name),
            OutcomeDetails::Movement { outcome },
        ))
    }
}

/// Secondary die decides whether a child is born
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabyBornEvent {
    /// Forces the die, clamped to 1-6
    pub fixed_roll: Option<u8>,
}

impl BabyBornEvent {
    pub fn fixed(roll: u8) -> Self {
        Self {
            fixed_roll: Some(roll),
        }
    }
}

impl EventHandler for BabyBornEvent {
    fn kind(&self) -> EventKind {
        EventKind::BabyBorn
    }

    fn handle(
        &self,
        player_id: &PlayerId,
        ctx: &mut HandlerContext<'_>,
    ) -> EventResult<EventOutcome> {
        let player = ctx.player(player_id)?;
        let die = match self.fixed_roll {
            Some(roll) => roll.clamp(1, 6),
            None => roll_d6(ctx.rng),
        };

        if die > 4 {
            log::info!("No baby for {} (rolled {die})", player.name);
            return Ok(EventOutcome::success(
                "No baby this time",
                OutcomeDetails::BabyBorn {
                    die,
                    baby_born: false,
                    children: player.children,
                    bonus: 0,
                },
            ));
        }

        if player.children >= ctx.economy.max_children {
            return Ok(EventOutcome::success(
                format!(
                    "Already at the maximum of {} children",
                    ctx.economy.max_children
                ),
                OutcomeDetails::BabyBorn {
                    die,
                    baby_born: false,
                    children: player.children,
                    bonus: 0,
                },
            ));
        }

        let children = player.children + 1;
        let bonus = ctx.economy.baby_bonus;
        ctx.patch(
            player_id,
            PlayerPatch {
                children: Some(children),
                ..Default::default()
            },
        )?;
        ctx.adjust_balance(player_id, bonus, "Baby bonus")?;

        log::info!("{} had a baby, {children} children now", player.name);

        ctx.bus.emit(BusEvent::BabyBorn {
            player_id: player_id.clone(),
            children,
            bonus,
        });

        Ok(EventOutcome::success(
            format!("A baby is born! +${bonus}"),
            OutcomeDetails::BabyBorn {
                die,
                baby_born: true,
                children,
                bonus,
            },
        ))
    }
}
