//! Player data models.

use crate::{
    board::{BoardPosition, Track},
    cards::Card,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole dollars. Signed because a PAYDAY can push a balance below zero
/// before bankruptcy is resolved.
pub type Money = i64;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A player's job: drives the salary/expense cycle at PAYDAY.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profession {
    pub id: String,
    pub name: String,
    pub salary: Money,
    pub expenses: Money,
}

impl Profession {
    pub fn new(id: &str, name: &str, salary: Money, expenses: Money) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            salary,
            expenses,
        }
    }

    /// Professions available at game start
    pub fn catalog() -> Vec<Self> {
        vec![
            Self::new("entrepreneur", "Entrepreneur", 10_000, 6_200),
            Self::new("engineer", "Engineer", 8_000, 4_500),
            Self::new("teacher", "Teacher", 4_000, 3_200),
            Self::new("doctor", "Doctor", 12_000, 7_500),
            Self::new("nurse", "Nurse", 3_500, 2_800),
            Self::new("lawyer", "Lawyer", 9_000, 5_500),
        ]
    }

    pub fn find(id: &str) -> Option<Self> {
        Self::catalog().into_iter().find(|p| p.id == id)
    }
}

/// Player model, as stored by a `PlayerManager`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Money,
    pub credit_amount: Money,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    pub passive_income: Money,
    pub assets: Vec<Card>,
    pub position: BoardPosition,
    pub children: u8,
    pub profession: Option<Profession>,
    pub is_active: bool,
    pub is_bankrupt: bool,
    pub bankruptcy_count: u32,
    pub last_payday: Option<DateTime<Utc>>,
    pub last_charity: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: &str, balance: Money) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.to_string(),
            balance,
            credit_amount: 0,
            monthly_income: 0,
            monthly_expenses: 0,
            passive_income: 0,
            assets: Vec::new(),
            position: BoardPosition::start(),
            children: 0,
            profession: None,
            is_active: true,
            is_bankrupt: false,
            bankruptcy_count: 0,
            last_payday: None,
            last_charity: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Assign a profession. Monthly income starts at the salary.
    pub fn with_profession(mut self, profession: Profession) -> Self {
        self.monthly_income = profession.salary;
        self.monthly_expenses = profession.expenses;
        self.profession = Some(profession);
        self
    }

    pub fn salary(&self) -> Money {
        self.profession.as_ref().map_or(0, |p| p.salary)
    }

    pub fn base_expenses(&self) -> Money {
        self.profession.as_ref().map_or(0, |p| p.expenses)
    }

    pub fn is_on_outer_track(&self) -> bool {
        self.position.track == Track::Outer
    }
}

/// Partial update applied by `PlayerManager::update_player`.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPatch {
    pub balance: Option<Money>,
    pub credit_amount: Option<Money>,
    pub monthly_income: Option<Money>,
    pub monthly_expenses: Option<Money>,
    pub passive_income: Option<Money>,
    pub assets: Option<Vec<Card>>,
    pub position: Option<BoardPosition>,
    pub children: Option<u8>,
    pub is_active: Option<bool>,
    pub is_bankrupt: Option<bool>,
    pub bankruptcy_count: Option<u32>,
    pub last_payday: Option<DateTime<Utc>>,
    pub last_charity: Option<DateTime<Utc>>,
}

impl PlayerPatch {
    pub fn apply(self, player: &mut Player) {
        if let Some(v) = self.balance {
            player.balance = v;
        }
        if let Some(v) = self.credit_amount {
            player.credit_amount = v;
        }
        if let Some(v) = self.monthly_income {
            player.monthly_income = v;
        }
        if let Some(v) = self.monthly_expenses {
            player.monthly_expenses = v;
        }
        if let Some(v) = self.passive_income {
            player.passive_income = v;
        }
        if let Some(v) = self.assets {
            player.assets = v;
        }
        if let Some(v) = self.position {
            player.position = v;
        }
        if let Some(v) = self.children {
            player.children = v;
        }
        if let Some(v) = self.is_active {
            player.is_active = v;
        }
        if let Some(v) = self.is_bankrupt {
            player.is_bankrupt = v;
        }
        if let Some(v) = self.bankruptcy_count {
            player.bankruptcy_count = v;
        }
        if let Some(v) = self.last_payday {
            player.last_payday = Some(v);
        }
        if let Some(v) = self.last_charity {
            player.last_charity = Some(v);
        }
        player.updated_at = Utc::now();
    }
}

/// Entry direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryDirection::Debit => write!(f, "debit"),
            EntryDirection::Credit => write!(f, "credit"),
        }
    }
}

/// One balance movement recorded by the in-memory manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub player_id: PlayerId,
    pub amount: Money,
    pub balance_after: Money,
    pub direction: EntryDirection,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
