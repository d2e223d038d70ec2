//! The amount bookkeeping shared by projects and donations.

use chrono::{DateTime, Utc};

use crate::{EngineError, ResultEngine};

/// The funding state of a project or a donation.
///
/// `invested_amount` only grows, never past `full_amount`, and the record is
/// closed (`fully_invested` with a `close_date`) exactly when the two meet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Funding {
    pub full_amount: i64,
    pub invested_amount: i64,
    pub fully_invested: bool,
    pub create_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
}

impl Funding {
    /// Fresh funding state with nothing invested yet.
    pub fn new(full_amount: i64, create_date: DateTime<Utc>) -> Self {
        Self {
            full_amount,
            invested_amount: 0,
            fully_invested: false,
            create_date,
            close_date: None,
        }
    }

    /// Capacity still available for investment.
    pub fn remaining(&self) -> i64 {
        self.full_amount - self.invested_amount
    }

    pub fn is_open(&self) -> bool {
        !self.fully_invested
    }

    /// Moves `amount` into the record and closes it when it becomes full.
    ///
    /// Returns `true` if this call closed the record.
    pub fn invest(&mut self, amount: i64, now: DateTime<Utc>) -> ResultEngine<bool> {
        if self.fully_invested {
            return Err(EngineError::InvalidInput(
                "cannot invest into a closed record".to_string(),
            ));
        }
        if amount <= 0 || amount > self.remaining() {
            return Err(EngineError::InvalidInput(format!(
                "invalid transfer {amount}: remaining capacity is {}",
                self.remaining()
            )));
        }

        self.invested_amount += amount;
        if self.invested_amount == self.full_amount {
            self.fully_invested = true;
            self.close_date = Some(now);
            return Ok(true);
        }
        Ok(false)
    }
}

/// The two kinds of funding record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Project,
    Donation,
}

impl Side {
    /// The kind a record of this side is matched against.
    pub fn counterpart(self) -> Side {
        match self {
            Side::Project => Side::Donation,
            Side::Donation => Side::Project,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Project => "charity_project",
            Side::Donation => "donation",
        }
    }
}

/// A persisted funding record identified by its side and id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Contribution {
    pub side: Side,
    pub id: i32,
}

impl Contribution {
    pub fn project(id: i32) -> Self {
        Self {
            side: Side::Project,
            id,
        }
    }

    pub fn donation(id: i32) -> Self {
        Self {
            side: Side::Donation,
            id,
        }
    }
}
