//! Session and authentication payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::non_blank;

/// Signed-in user as returned by the login endpoint
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl SessionUser {
    /// Borrower name shown on the borrow form
    pub fn display_name(&self) -> Option<String> {
        [&self.full_name, &self.name, &self.username, &self.email]
            .into_iter()
            .find_map(|field| non_blank(field.as_deref()))
            .map(str::to_string)
    }
}

/// Persisted session object: `{token, exp, user}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Expiry as unix seconds
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.map(|exp| exp <= now.timestamp()).unwrap_or(false)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().and_then(|u| u.id)
    }

    pub fn borrower_name(&self) -> Option<String> {
        self.user.as_ref().and_then(SessionUser::display_name)
    }
}

/// `POST /api/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

/// `POST /api/auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login/register response; registration may omit the token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl AuthResponse {
    pub fn into_session(self) -> Option<Session> {
        let token = self.token.filter(|t| !t.trim().is_empty())?;
        Some(Session {
            token,
            exp: self.exp,
            user: self.user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_full_name() {
        let user = SessionUser {
            username: Some("jdoe".into()),
            full_name: Some("Jane Doe".into()),
            email: Some("jane@lab.edu".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name().as_deref(), Some("Jane Doe"));

        let user = SessionUser {
            full_name: Some(" ".into()),
            email: Some("jane@lab.edu".into()),
            ..Default::default()
        };
        assert_eq!(user.display_name().as_deref(), Some("jane@lab.edu"));
    }

    #[test]
    fn response_without_token_has_no_session() {
        assert!(AuthResponse::default().into_session().is_none());
        let response = AuthResponse {
            token: Some("abc".into()),
            exp: Some(10),
            user: None,
        };
        let session = response.into_session().unwrap();
        assert_eq!(session.token, "abc");
        assert!(session.is_expired(Utc::now()));
    }
}
