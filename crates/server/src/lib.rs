use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod donations;
mod projects;
mod server;
mod user;

pub mod types {
    pub mod project {
        pub use api_types::project::{ProjectNew, ProjectUpdate, ProjectView};
    }

    pub mod donation {
        pub use api_types::donation::{DonationFullView, DonationNew, DonationView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Unauthorized,
    Forbidden,
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::DuplicateName(_)
        | EngineError::ClosedProject(_)
        | EngineError::AmountBelowInvested { .. }
        | EngineError::HasInvestment(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Conflict(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Conflict(reason) => {
            tracing::error!("unresolved write conflict: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            ServerError::Forbidden => (
                StatusCode::FORBIDDEN,
                "superuser privileges required".to_string(),
            ),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
