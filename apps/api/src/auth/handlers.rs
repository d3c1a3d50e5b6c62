use axum::{extract::State, http::StatusCode, Json};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::extractors::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo;
use crate::errors::AppError;
use crate::models::user::User;
use crate::response::ApiResponse;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub profession: Option<String>,
    pub preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: User,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Non-empty trimmed value of an optional request field.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Shallow merge: top-level keys of `patch` replace those in `current`.
/// A non-object on either side yields `patch`.
pub fn merge_preferences(current: &Value, patch: &Value) -> Value {
    match (current, patch) {
        (Value::Object(base), Value::Object(update)) => {
            let mut merged = base.clone();
            for (k, v) in update {
                merged.insert(k.clone(), v.clone());
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}

/// A concurrent registration can pass the existence check and still lose the
/// race on `UNIQUE(email)`.
fn duplicate_email_as_conflict(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("User already exists with this email".into())
        }
        _ => AppError::Database(e),
    }
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    let (Some(name), Some(email), Some(password)) =
        (present(&req.name), present(&req.email), req.password.as_deref())
    else {
        return Err(AppError::Validation(
            "Name, email and password are required".into(),
        ));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation("Please provide a valid email".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if repo::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "registration with existing email");
        return Err(AppError::Conflict(
            "User already exists with this email".into(),
        ));
    }

    let hash = hash_password(password)?;
    let user = repo::create(&state.db, name, &email, &hash, present(&req.profession))
        .await
        .map_err(duplicate_email_as_conflict)?;
    let token = state.jwt.sign(user.id)?;

    info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::ok(AuthPayload { token, user })
        .with_message("User registered successfully")
        .with_status(StatusCode::CREATED))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<ApiResponse<AuthPayload>, AppError> {
    let (Some(email), Some(password)) = (present(&req.email), req.password.as_deref()) else {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    };
    if password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    }

    let email = normalize_email(email);
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let user = repo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "failed login attempt");
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is deactivated".into()));
    }

    repo::touch_last_login(&state.db, user.id).await?;
    let token = state.jwt.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::ok(AuthPayload { token, user }).with_message("Login successful"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<UserPayload>, AppError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".into()))?;
    Ok(ApiResponse::ok(UserPayload { user }))
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ProfileUpdate>,
) -> Result<ApiResponse<UserPayload>, AppError> {
    let current = repo::find_by_id(&state.db, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".into()))?;

    let preferences = match &req.preferences {
        Some(patch) => merge_preferences(&current.preferences, patch),
        None => current.preferences.clone(),
    };

    let user = repo::update_profile(
        &state.db,
        user_id,
        present(&req.name),
        present(&req.profession),
        &preferences,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ApiResponse::ok(UserPayload { user }).with_message("Profile updated successfully"))
}

/// POST /api/auth/logout
/// Tokens are stateless; the client discards its copy.
pub async fn logout(AuthUser(user_id): AuthUser) -> ApiResponse<()> {
    info!(user_id = %user_id, "user logged out");
    ApiResponse::message("Logout successful")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "fake database error"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::Other
            }
        }
    }

    #[test]
    fn test_unique_violation_on_insert_is_conflict() {
        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: true }));
        assert!(matches!(
            duplicate_email_as_conflict(err),
            AppError::Conflict(_)
        ));

        let err = sqlx::Error::Database(Box::new(FakeDbError { unique: false }));
        assert!(matches!(
            duplicate_email_as_conflict(err),
            AppError::Database(_)
        ));
        assert!(matches!(
            duplicate_email_as_conflict(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn test_present_ignores_blank_fields() {
        assert_eq!(present(&Some("  ".into())), None);
        assert_eq!(present(&Some(" Ana ".into())), Some("Ana"));
        assert_eq!(present(&None), None);
    }

    #[test]
    fn test_merge_preferences_is_shallow() {
        let current = json!({"theme": "dark", "notifications": {"email": true}, "lang": "en"});
        let patch = json!({"notifications": {"sms": true}, "lang": "fr"});
        let merged = merge_preferences(&current, &patch);
        assert_eq!(
            merged,
            json!({"theme": "dark", "notifications": {"sms": true}, "lang": "fr"})
        );
    }

    #[test]
    fn test_merge_preferences_non_object_replaces() {
        assert_eq!(merge_preferences(&json!(null), &json!({"a": 1})), json!({"a": 1}));
    }
}
