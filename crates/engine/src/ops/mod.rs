use std::future::Future;

use sea_orm::{DatabaseConnection, DbErr};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

mod donations;
mod guard;
mod ledger;
mod matching;
mod projects;

/// Attempts a conflicting unit of work gets before the conflict is reported
/// as a storage failure.
pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 5;

/// Maximum length of a project name, in characters.
pub const MAX_PROJECT_NAME_LEN: usize = 100;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    max_settle_attempts: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Runs `op` until it succeeds, fails for a reason other than a write
    /// conflict, or runs out of attempts.
    async fn retrying<T, F, Fut>(&self, what: &str, mut op: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_conflict() => {
                    if attempt >= self.max_settle_attempts {
                        return Err(EngineError::Database(DbErr::Custom(format!(
                            "{what} still conflicting after {attempt} attempts: {err}"
                        ))));
                    }
                    tracing::warn!(attempt, "{what} conflicted, retrying: {err}");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Trim and NFC-normalize a project name, enforcing its length bounds.
pub(crate) fn normalize_project_name(value: &str) -> ResultEngine<String> {
    let name: String = value.trim().nfc().collect();
    if name.is_empty() {
        return Err(EngineError::InvalidInput(
            "project name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_PROJECT_NAME_LEN {
        return Err(EngineError::InvalidInput(format!(
            "project name must be at most {MAX_PROJECT_NAME_LEN} characters"
        )));
    }
    Ok(name)
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn require_positive_amount(amount: i64, label: &str) -> ResultEngine<i64> {
    if amount <= 0 {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be > 0, got {amount}"
        )));
    }
    Ok(amount)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    max_settle_attempts: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How many times a conflicting write is attempted before giving up.
    pub fn max_settle_attempts(mut self, attempts: u32) -> EngineBuilder {
        self.max_settle_attempts = Some(attempts);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let max_settle_attempts = self.max_settle_attempts.unwrap_or(DEFAULT_SETTLE_ATTEMPTS);
        if max_settle_attempts == 0 {
            return Err(EngineError::InvalidInput(
                "max_settle_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            max_settle_attempts,
        })
    }
}
