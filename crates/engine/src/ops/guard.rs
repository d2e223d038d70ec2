//! Preconditions checked before a project is created, updated or deleted.
//!
//! Nothing here writes; the callers persist once a guard has passed.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseTransaction;

use crate::{EngineError, Project, ProjectPatch, ResultEngine};

use super::Engine;

impl Engine {
    /// Fails with `DuplicateName` if a project is already called `name`.
    pub(super) async fn guard_create(
        &self,
        db: &DatabaseTransaction,
        name: &str,
    ) -> ResultEngine<()> {
        if self.find_project_by_name(db, name).await?.is_some() {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    /// Checks `patch` against the stored `project`.
    ///
    /// A closed project rejects every patch. Otherwise a rename must not
    /// collide with another project and `full_amount` may not drop below the
    /// invested amount.
    pub(super) async fn guard_update(
        &self,
        db: &DatabaseTransaction,
        project: &Project,
        patch: &ProjectPatch,
    ) -> ResultEngine<()> {
        ensure_open(project)?;
        if let Some(name) = patch.name.as_deref()
            && name != project.name
        {
            self.guard_create(db, name).await?;
        }
        ensure_full_amount_covers_investment(project, patch)
    }
}

/// Fails with `HasInvestment` unless nothing was invested in the project.
pub(super) fn guard_delete(project: &Project) -> ResultEngine<()> {
    if project.funding.invested_amount != 0 {
        return Err(EngineError::HasInvestment(project.id));
    }
    Ok(())
}

fn ensure_open(project: &Project) -> ResultEngine<()> {
    if project.funding.fully_invested {
        return Err(EngineError::ClosedProject(project.id));
    }
    Ok(())
}

fn ensure_full_amount_covers_investment(
    project: &Project,
    patch: &ProjectPatch,
) -> ResultEngine<()> {
    if let Some(full_amount) = patch.full_amount
        && full_amount < project.funding.invested_amount
    {
        return Err(EngineError::AmountBelowInvested {
            full_amount,
            invested_amount: project.funding.invested_amount,
        });
    }
    Ok(())
}

/// Applies the fields present in `patch`.
///
/// Lowering `full_amount` onto the invested amount leaves no capacity, so the
/// project is closed at `now`.
pub(super) fn apply_patch(project: &mut Project, patch: ProjectPatch, now: DateTime<Utc>) {
    if let Some(name) = patch.name {
        project.name = name;
    }
    if let Some(description) = patch.description {
        project.description = description;
    }
    if let Some(full_amount) = patch.full_amount {
        project.funding.full_amount = full_amount;
        if project.funding.remaining() == 0 {
            project.funding.fully_invested = true;
            project.funding.close_date = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::Funding;

    fn project(full_amount: i64, invested_amount: i64) -> Project {
        let mut funding = Funding::new(full_amount, Utc.timestamp_opt(0, 0).unwrap());
        if invested_amount > 0 {
            funding.invest(invested_amount, Utc::now()).unwrap();
        }
        Project {
            id: 7,
            name: "Roof".to_string(),
            description: "Fix the shelter roof".to_string(),
            funding,
        }
    }

    #[test]
    fn delete_requires_no_investment() {
        assert!(guard_delete(&project(100, 0)).is_ok());
        assert_eq!(
            guard_delete(&project(100, 5)).unwrap_err(),
            EngineError::HasInvestment(7)
        );
    }

    #[test]
    fn closed_project_rejects_any_patch() {
        let closed = project(100, 100);
        assert_eq!(ensure_open(&closed).unwrap_err(), EngineError::ClosedProject(7));
    }

    #[test]
    fn full_amount_below_invested_is_rejected() {
        let patch = ProjectPatch {
            full_amount: Some(30),
            ..Default::default()
        };
        assert_eq!(
            ensure_full_amount_covers_investment(&project(100, 40), &patch).unwrap_err(),
            EngineError::AmountBelowInvested {
                full_amount: 30,
                invested_amount: 40,
            }
        );
    }

    #[test]
    fn full_amount_equal_to_invested_is_accepted() {
        let patch = ProjectPatch {
            full_amount: Some(40),
            ..Default::default()
        };
        assert!(ensure_full_amount_covers_investment(&project(100, 40), &patch).is_ok());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut target = project(100, 10);
        apply_patch(
            &mut target,
            ProjectPatch {
                description: Some("New roof tiles".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(target.name, "Roof");
        assert_eq!(target.description, "New roof tiles");
        assert_eq!(target.funding.full_amount, 100);
        assert!(!target.funding.fully_invested);
    }

    #[test]
    fn patch_down_to_invested_closes_project() {
        let mut target = project(100, 40);
        let now = Utc::now();
        apply_patch(
            &mut target,
            ProjectPatch {
                full_amount: Some(40),
                ..Default::default()
            },
            now,
        );

        assert!(target.funding.fully_invested);
        assert_eq!(target.funding.close_date, Some(now));
    }
}
