//! Funding engine for charity projects and donations.
//!
//! Every new project or donation is matched against the oldest records of the
//! other kind that still have capacity, moving money between the two until
//! the new record is fully invested or nothing is left to match. The engine
//! is the only writer of the invested amounts; projects can otherwise be
//! renamed, re-described or resized while open, and deleted while nothing
//! has been invested in them.
//!
//! ```no_run
//! # async fn demo(db: sea_orm::DatabaseConnection) -> Result<(), engine::EngineError> {
//! use engine::{DonationNew, Engine, ProjectNew};
//!
//! let engine = Engine::builder().database(db).build().await?;
//! engine
//!     .new_donation("alice", DonationNew { full_amount: 100, comment: None })
//!     .await?;
//! let project = engine
//!     .new_project(ProjectNew {
//!         name: "Roof".to_string(),
//!         description: "Fix the shelter roof".to_string(),
//!         full_amount: 60,
//!     })
//!     .await?;
//! assert!(project.funding.fully_invested);
//! # Ok(())
//! # }
//! ```

pub use charity_projects::{Project, ProjectNew, ProjectPatch};
pub use donations::{Donation, DonationNew};
pub use error::EngineError;
pub use funding::{Contribution, Funding, Side};
pub use ops::{DEFAULT_SETTLE_ATTEMPTS, Engine, EngineBuilder, MAX_PROJECT_NAME_LEN};

mod charity_projects;
mod donations;
mod error;
mod funding;
mod ops;

type ResultEngine<T> = Result<T, EngineError>;
