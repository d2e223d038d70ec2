use axum::{
    Extension, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{ServerError, donations, projects, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the Basic credentials to a `users` row and stores it as a
/// request extension.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(ServerError::Unauthorized);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(credentials.username()))
        .filter(user::Column::Password.eq(credentials.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            ServerError::Unauthorized
        })?;

    let Some(user) = user else {
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Lets only superusers through. Must run after [`auth`].
async fn require_superuser(
    Extension(user): Extension<user::Model>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !user.is_superuser {
        return Err(ServerError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    let superuser = Router::new()
        .route("/charity_project", post(projects::create))
        .route(
            "/charity_project/{project_id}",
            patch(projects::update).delete(projects::remove),
        )
        .route("/donation", get(donations::list))
        .route_layer(middleware::from_fn(require_superuser))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let donors = Router::new()
        .route("/donation", post(donations::create))
        .route("/donation/my", get(donations::mine))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let public = Router::new().route("/charity_project", get(projects::list));

    public.merge(superuser).merge(donors).with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}
