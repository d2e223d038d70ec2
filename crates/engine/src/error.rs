//! The module contains the error the engine can throw.
//!
//! Guard errors ([`DuplicateName`], [`ClosedProject`], [`AmountBelowInvested`],
//! [`HasInvestment`]) reject a request before anything is written.
//! [`Conflict`] is raised by a settlement round that lost a race with another
//! writer; the engine retries it and only surfaces it wrapped in
//! [`Database`] once the attempts are exhausted.
//!
//!  [`DuplicateName`]: EngineError::DuplicateName
//!  [`ClosedProject`]: EngineError::ClosedProject
//!  [`AmountBelowInvested`]: EngineError::AmountBelowInvested
//!  [`HasInvestment`]: EngineError::HasInvestment
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("project named \"{0}\" already exists")]
    DuplicateName(String),
    #[error("project {0} is closed and cannot be edited")]
    ClosedProject(i32),
    #[error("full_amount {full_amount} is below the invested amount {invested_amount}")]
    AmountBelowInvested {
        full_amount: i64,
        invested_amount: i64,
    },
    #[error("project {0} already has investments and cannot be deleted")]
    HasInvestment(i32),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("concurrent modification: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` when retrying the same unit of work may succeed.
    pub(crate) fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict(_) => true,
            Self::Database(err) => is_contention(err),
            _ => false,
        }
    }
}

/// SQLite primary result codes for a busy or locked database.
const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// Lock and busy failures reported by SQLite while two writers race on the
/// same rows.
fn is_contention(err: &DbErr) -> bool {
    let (DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = err else {
        return false;
    };
    let RuntimeErr::SqlxError(sqlx_err) = runtime else {
        return false;
    };
    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| is_busy_code(&code))
}

/// SQLite reports extended codes (e.g. 517 for a stale WAL snapshot); the
/// primary code sits in the low byte.
fn is_busy_code(code: &str) -> bool {
    code.parse::<i64>()
        .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateName(a), Self::DuplicateName(b)) => a == b,
            (Self::ClosedProject(a), Self::ClosedProject(b)) => a == b,
            (
                Self::AmountBelowInvested {
                    full_amount: a_full,
                    invested_amount: a_invested,
                },
                Self::AmountBelowInvested {
                    full_amount: b_full,
                    invested_amount: b_invested,
                },
            ) => a_full == b_full && a_invested == b_invested,
            (Self::HasInvestment(a), Self::HasInvestment(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retryable() {
        assert!(EngineError::Conflict("round".to_string()).is_conflict());
    }

    #[test]
    fn busy_and_locked_codes_are_retryable() {
        for code in ["5", "6", "261", "517", "262"] {
            assert!(is_busy_code(code), "code {code}");
        }
        for code in ["1", "19", "2067", "not a code"] {
            assert!(!is_busy_code(code), "code {code}");
        }
    }

    #[test]
    fn lock_wording_without_a_database_code_is_not_retryable() {
        let err = EngineError::Database(DbErr::Custom(
            "error returned from database: (code: 5) database is locked".to_string(),
        ));
        assert!(!err.is_conflict());
    }

    #[test]
    fn guard_errors_are_not_retryable() {
        assert!(!EngineError::DuplicateName("Roof".to_string()).is_conflict());
        assert!(!EngineError::HasInvestment(1).is_conflict());
        assert!(!EngineError::Database(DbErr::Custom("disk I/O error".to_string())).is_conflict());
    }
}
