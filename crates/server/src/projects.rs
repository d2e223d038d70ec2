//! Charity project API endpoints.

use api_types::project::{ProjectNew, ProjectUpdate, ProjectView};
use axum::{
    Json,
    extract::{Path, State},
};
use engine::EngineError;

use crate::{ServerError, server::ServerState};

fn map_project(project: engine::Project) -> ProjectView {
    ProjectView {
        id: project.id,
        name: project.name,
        description: project.description,
        full_amount: project.funding.full_amount,
        invested_amount: project.funding.invested_amount,
        fully_invested: project.funding.fully_invested,
        create_date: project.funding.create_date,
        close_date: project.funding.close_date,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProjectView>>, ServerError> {
    let projects = state
        .engine
        .projects()
        .await?
        .into_iter()
        .map(map_project)
        .collect();

    Ok(Json(projects))
}

/// Handle requests for creating a project. The response reflects the
/// donations it already absorbed.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProjectNew>,
) -> Result<Json<ProjectView>, ServerError> {
    let project = state
        .engine
        .new_project(engine::ProjectNew {
            name: payload.name,
            description: payload.description,
            full_amount: payload.full_amount,
        })
        .await?;

    Ok(Json(map_project(project)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(project_id): Path<i32>,
    Json(payload): Json<ProjectUpdate>,
) -> Result<Json<ProjectView>, ServerError> {
    if payload.is_empty() {
        return Err(EngineError::InvalidInput(
            "provide at least one of name, description or full_amount".to_string(),
        )
        .into());
    }

    let project = state
        .engine
        .update_project(
            project_id,
            engine::ProjectPatch {
                name: payload.name,
                description: payload.description,
                full_amount: payload.full_amount,
            },
        )
        .await?;

    Ok(Json(map_project(project)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(project_id): Path<i32>,
) -> Result<Json<ProjectView>, ServerError> {
    let project = state.engine.delete_project(project_id).await?;
    Ok(Json(map_project(project)))
}
