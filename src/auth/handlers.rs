use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        password::{hash_password, verify_password},
        repo::User,
        session::{
            build_session_cookie, clear_session_cookie, MaybeAuthUser, SessionKeys,
        },
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(profile))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn set_cookie_headers(cookie: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        HeaderValue::from_str(cookie).map_err(|e| ApiError::Internal(e.into()))?,
    );
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }

    // Pre-check for a friendlier message; the unique constraint still
    // backstops concurrent registrations.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    // A concurrent registration slips past the pre-check; the unique
    // constraint surfaces as a 409 through the sqlx error mapping.
    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse { success: true }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized);
    }

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;
    let headers = set_cookie_headers(&build_session_cookie(&token, keys.ttl.as_secs()))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            success: true,
            data: PublicUser {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

/// Anonymous callers get `null`, not an error; the frontend probes this on
/// every page load.
#[instrument(skip(state, session))]
pub async fn profile(
    State(state): State<AppState>,
    MaybeAuthUser(session): MaybeAuthUser,
) -> Result<Json<Option<PublicUser>>, ApiError> {
    let Some(claims) = session else {
        return Ok(Json(None));
    };

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(Some(PublicUser {
        id: user.id,
        name: user.name,
        email: user.email,
    })))
}

/// Logout only clears the cookie; the token itself stays valid until it
/// expires, there is no revocation list.
#[instrument]
pub async fn logout() -> Result<(HeaderMap, Json<bool>), ApiError> {
    let headers = set_cookie_headers(&clear_session_cookie())?;
    Ok((headers, Json(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("spaces in@x.com"));
    }

    #[test]
    fn login_sets_session_cookie_header() {
        let headers =
            set_cookie_headers(&build_session_cookie("tok", 60)).expect("headers");
        let value = headers.get(SET_COOKIE).expect("set-cookie present");
        assert!(value.to_str().unwrap().starts_with("token=tok"));
    }

    #[test]
    fn logout_clears_cookie() {
        let headers = set_cookie_headers(&clear_session_cookie()).expect("headers");
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.contains("Max-Age=0"));
    }
}
