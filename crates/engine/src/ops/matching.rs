//! Matching of new projects and donations against the oldest outstanding
//! counterparts.
//!
//! Each round moves `min(remaining project, remaining donation)` between the
//! new record and the oldest open record of the other side, inside its own
//! transaction. Rounds repeat while the counterpart gets closed and the new
//! record still has capacity. A round that loses a race with another writer
//! is rolled back and recomputed from fresh reads; rounds that already
//! committed stay committed.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{Contribution, EngineError, Funding, ResultEngine};

use super::{Engine, ledger, with_tx};

/// What a single round left behind.
#[derive(Debug)]
enum Round {
    /// The counterpart was closed and the record still has capacity.
    Continue(Funding),
    /// Nothing more to match for the record.
    Settled(Funding),
}

impl Engine {
    /// Allocates capacity between `record` and the oldest open counterparts
    /// until `record` is fully invested or no counterpart is left.
    ///
    /// Calling it on a closed record, or when no counterpart is open, writes
    /// nothing and returns the current state.
    pub async fn settle(&self, record: Contribution) -> ResultEngine<Funding> {
        let mut invested = None;
        loop {
            let round = self
                .retrying(&format!("settlement of {} {}", record.side.label(), record.id), || {
                    self.settle_round(record)
                })
                .await?;
            match round {
                Round::Settled(funding) => return Ok(funding),
                Round::Continue(funding) => {
                    if invested.is_some_and(|previous| funding.invested_amount <= previous) {
                        return Err(EngineError::Conflict(format!(
                            "settlement of {} {} made no progress",
                            record.side.label(),
                            record.id
                        )));
                    }
                    invested = Some(funding.invested_amount);
                }
            }
        }
    }

    async fn settle_round(&self, record: Contribution) -> ResultEngine<Round> {
        with_tx!(self, |db_tx| self.match_once(&db_tx, record).await)
    }

    async fn match_once(&self, db: &DatabaseTransaction, record: Contribution) -> ResultEngine<Round> {
        let current = ledger::funding(db, record).await?.ok_or_else(|| {
            EngineError::KeyNotFound(format!("{} {}", record.side.label(), record.id))
        })?;
        if !current.is_open() {
            return Ok(Round::Settled(current));
        }

        let Some((counterpart, counterpart_before)) =
            ledger::oldest_open(db, record.side.counterpart()).await?
        else {
            return Ok(Round::Settled(current));
        };

        let transfer = current.remaining().min(counterpart_before.remaining());
        let now = Utc::now();

        let mut record_after = current.clone();
        let record_closed = record_after.invest(transfer, now)?;
        let mut counterpart_after = counterpart_before.clone();
        let counterpart_closed = counterpart_after.invest(transfer, now)?;

        if !ledger::store(db, record, &current, &record_after).await? {
            return Err(EngineError::Conflict(format!(
                "{} {} changed during settlement",
                record.side.label(),
                record.id
            )));
        }
        if !ledger::store(db, counterpart, &counterpart_before, &counterpart_after).await? {
            return Err(EngineError::Conflict(format!(
                "{} {} changed during settlement",
                counterpart.side.label(),
                counterpart.id
            )));
        }

        tracing::debug!(
            record = %format!("{} {}", record.side.label(), record.id),
            counterpart = %format!("{} {}", counterpart.side.label(), counterpart.id),
            transfer,
            record_closed,
            counterpart_closed,
            "settlement round"
        );

        if counterpart_closed && !record_closed {
            Ok(Round::Continue(record_after))
        } else {
            Ok(Round::Settled(record_after))
        }
    }
}
