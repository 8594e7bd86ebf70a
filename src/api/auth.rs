//! Login, registration and logout

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use axum_extra::{headers::Host, TypedHeader};
use serde::Serialize;

use crate::{
    error::AppResult,
    forms::{LoginForm, RegisterForm},
    models::{Session, SessionUser},
    session::{auth_cookie, removal_cookie},
    AppState,
};

/// Session as shown to the browser; the token itself stays in the cookie
#[derive(Serialize)]
pub struct SessionView {
    pub signed_in: bool,
    pub user: Option<SessionUser>,
    pub display_name: Option<String>,
    pub exp: Option<i64>,
}

impl From<Option<&Session>> for SessionView {
    fn from(session: Option<&Session>) -> Self {
        Self {
            signed_in: session.is_some(),
            user: session.and_then(|s| s.user.clone()),
            display_name: session.and_then(Session::borrower_name),
            exp: session.and_then(|s| s.exp),
        }
    }
}

fn hostname(host: &Option<TypedHeader<Host>>) -> String {
    host.as_ref()
        .map(|TypedHeader(host)| host.hostname().to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

fn session_cookie(state: &AppState, host: &Option<TypedHeader<Host>>, session: &Session) -> String {
    auth_cookie(
        &hostname(host),
        &state.config.session.cookie_name,
        &session.token,
        state.config.session.max_age_secs,
    )
}

pub async fn login(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Json(form): Json<LoginForm>,
) -> AppResult<impl IntoResponse> {
    let session = state.services.auth.login(form).await?;
    let cookie = session_cookie(&state, &host, &session);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(SessionView::from(Some(&session))),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
    Json(form): Json<RegisterForm>,
) -> AppResult<impl IntoResponse> {
    let session = state.services.auth.register(form).await?;
    let cookies: Vec<_> = session
        .iter()
        .map(|s| (SET_COOKIE, session_cookie(&state, &host, s)))
        .collect();
    Ok((
        AppendHeaders(cookies),
        Json(SessionView::from(session.as_ref())),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    host: Option<TypedHeader<Host>>,
) -> AppResult<impl IntoResponse> {
    state.services.auth.logout().await?;
    let cookie = removal_cookie(&hostname(&host), &state.config.session.cookie_name);
    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/login")))
}

pub async fn session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.services.auth.current().await;
    Json(SessionView::from(session.as_ref()))
}
