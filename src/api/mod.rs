//! HTTP routes of the portal. Every page answers with a JSON view model
//! or a redirect.

pub mod auth;
pub mod borrow;
pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod instructions;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::Session, AppState};

/// The signed-in session. Handlers taking this extractor are gated: without
/// a session the request is redirected to `/login`.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .auth
            .current()
            .await
            .map(CurrentSession)
            .ok_or(AppError::Unauthorized)
    }
}

/// `/` sends signed-in users to the dashboard and everyone else to login
async fn root(session: Option<CurrentSession>) -> Redirect {
    match session {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

async fn fallback() -> Redirect {
    Redirect::to("/")
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        // Session
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session))
        // Dashboard
        .route("/dashboard", get(dashboard::show))
        .route("/dashboard/sort", post(dashboard::sort))
        // Equipment browser
        .route("/equipments", get(equipment::list))
        .route("/equipments/:id", get(equipment::detail))
        .route("/equipments/:id/notes", post(equipment::add_note))
        .route("/instructions/:id", get(instructions::show))
        // Signed-in only
        .route("/add-item", get(borrow::add_item_form).post(borrow::add_item))
        .route("/borrow", get(borrow::borrow_form).post(borrow::borrow))
        .route("/borrow/suggestions", get(borrow::suggestions))
        .route("/return", post(borrow::return_item))
        .route("/borrow/scan/:region", post(borrow::scan))
        .route("/borrow/scan", axum::routing::delete(borrow::stop_scan))
        .fallback(fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
