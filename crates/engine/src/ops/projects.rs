use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
    prelude::*,
};

use crate::{
    Contribution, EngineError, Project, ProjectNew, ProjectPatch, ResultEngine, charity_projects,
};

use super::{
    Engine,
    guard::{apply_patch, guard_delete},
    normalize_project_name, normalize_required_text, require_positive_amount, with_tx,
};

/// Reports a unique-constraint violation on the name column as a duplicate.
fn duplicate_name_or(err: DbErr, name: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::DuplicateName(name.to_string()),
        _ => EngineError::Database(err),
    }
}

impl Engine {
    pub(super) async fn find_project(
        &self,
        db: &DatabaseTransaction,
        project_id: i32,
    ) -> ResultEngine<Option<Project>> {
        let model = charity_projects::Entity::find_by_id(project_id)
            .one(db)
            .await?;
        Ok(model.map(Project::from))
    }

    pub(super) async fn require_project(
        &self,
        db: &DatabaseTransaction,
        project_id: i32,
    ) -> ResultEngine<Project> {
        self.find_project(db, project_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("charity_project {project_id}")))
    }

    pub(super) async fn find_project_by_name(
        &self,
        db: &DatabaseTransaction,
        name: &str,
    ) -> ResultEngine<Option<Project>> {
        let model = charity_projects::Entity::find()
            .filter(charity_projects::Column::Name.eq(name))
            .one(db)
            .await?;
        Ok(model.map(Project::from))
    }

    /// Creates a project and matches it against the outstanding donations.
    ///
    /// The returned project reflects the settlement.
    pub async fn new_project(&self, input: ProjectNew) -> ResultEngine<Project> {
        let name = normalize_project_name(&input.name)?;
        let description = normalize_required_text(&input.description, "description")?;
        let full_amount = require_positive_amount(input.full_amount, "full_amount")?;

        let project_id = self
            .retrying("insertion of charity_project", || {
                self.insert_project(name.clone(), description.clone(), full_amount)
            })
            .await?;
        tracing::info!(project_id, name = %name, full_amount, "created charity project");

        self.settle(Contribution::project(project_id)).await?;
        self.project(project_id).await
    }

    async fn insert_project(
        &self,
        name: String,
        description: String,
        full_amount: i64,
    ) -> ResultEngine<i32> {
        with_tx!(self, |db_tx| {
            self.guard_create(&db_tx, &name).await?;

            let model = charity_projects::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(description),
                full_amount: ActiveValue::Set(full_amount),
                invested_amount: ActiveValue::Set(0),
                fully_invested: ActiveValue::Set(false),
                create_date: ActiveValue::Set(Utc::now()),
                close_date: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| duplicate_name_or(err, &name))?;
            Ok(model.id)
        })
    }

    /// Return a project snapshot from DB.
    pub async fn project(&self, project_id: i32) -> ResultEngine<Project> {
        with_tx!(self, |db_tx| self.require_project(&db_tx, project_id).await)
    }

    /// Looks a project up by its (normalized) name.
    pub async fn project_by_name(&self, name: &str) -> ResultEngine<Option<Project>> {
        let name = normalize_project_name(name)?;
        with_tx!(self, |db_tx| self.find_project_by_name(&db_tx, &name).await)
    }

    /// All projects, oldest first.
    pub async fn projects(&self) -> ResultEngine<Vec<Project>> {
        with_tx!(self, |db_tx| {
            let models = charity_projects::Entity::find()
                .order_by_asc(charity_projects::Column::CreateDate)
                .order_by_asc(charity_projects::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Project::from).collect())
        })
    }

    /// Edits name, description or `full_amount` of an open project.
    ///
    /// Raising `full_amount` does not match the new capacity against waiting
    /// donations; call [`Engine::settle`] for that.
    pub async fn update_project(
        &self,
        project_id: i32,
        patch: ProjectPatch,
    ) -> ResultEngine<Project> {
        let patch = ProjectPatch {
            name: patch.name.as_deref().map(normalize_project_name).transpose()?,
            description: patch
                .description
                .as_deref()
                .map(|d| normalize_required_text(d, "description"))
                .transpose()?,
            full_amount: patch
                .full_amount
                .map(|amount| require_positive_amount(amount, "full_amount"))
                .transpose()?,
        };

        let project = self
            .retrying(&format!("update of charity_project {project_id}"), || {
                self.update_project_once(project_id, patch.clone())
            })
            .await?;
        tracing::info!(project_id, "updated charity project");
        Ok(project)
    }

    async fn update_project_once(
        &self,
        project_id: i32,
        patch: ProjectPatch,
    ) -> ResultEngine<Project> {
        with_tx!(self, |db_tx| {
            let mut project = self.require_project(&db_tx, project_id).await?;
            self.guard_update(&db_tx, &project, &patch).await?;

            let before = project.funding.clone();
            apply_patch(&mut project, patch, Utc::now());

            let name = project.name.clone();
            let result = charity_projects::Entity::update_many()
                .set(charity_projects::ActiveModel {
                    name: ActiveValue::Set(project.name.clone()),
                    description: ActiveValue::Set(project.description.clone()),
                    full_amount: ActiveValue::Set(project.funding.full_amount),
                    fully_invested: ActiveValue::Set(project.funding.fully_invested),
                    close_date: ActiveValue::Set(project.funding.close_date),
                    ..Default::default()
                })
                .filter(charity_projects::Column::Id.eq(project_id))
                .filter(charity_projects::Column::InvestedAmount.eq(before.invested_amount))
                .filter(charity_projects::Column::FullyInvested.eq(false))
                .exec(&db_tx)
                .await
                .map_err(|err| duplicate_name_or(err, &name))?;
            if result.rows_affected != 1 {
                return Err(EngineError::Conflict(format!(
                    "charity_project {project_id} changed during update"
                )));
            }
            Ok(project)
        })
    }

    /// Removes a project nothing was invested in. Returns the removed record.
    pub async fn delete_project(&self, project_id: i32) -> ResultEngine<Project> {
        let project = self
            .retrying(&format!("deletion of charity_project {project_id}"), || {
                self.delete_project_once(project_id)
            })
            .await?;
        tracing::info!(project_id, "deleted charity project");
        Ok(project)
    }

    async fn delete_project_once(&self, project_id: i32) -> ResultEngine<Project> {
        with_tx!(self, |db_tx| {
            let project = self.require_project(&db_tx, project_id).await?;
            guard_delete(&project)?;

            let result = charity_projects::Entity::delete_many()
                .filter(charity_projects::Column::Id.eq(project_id))
                .filter(charity_projects::Column::InvestedAmount.eq(0))
                .exec(&db_tx)
                .await?;
            if result.rows_affected != 1 {
                return Err(EngineError::Conflict(format!(
                    "charity_project {project_id} changed during deletion"
                )));
            }
            Ok(project)
        })
    }
}
