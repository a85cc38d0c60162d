//! Google OAuth flow
//!
//! Implements the OAuth 2.0 authorization code flow with Google.
//! Google supplies the stable opaque user id (`sub`) and verified email
//! that own every record in the system.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::session::{Session, create_session_token};
use crate::AppState;
use crate::error::AppError;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const STATE_COOKIE: &str = "oauth_state";
const SESSION_COOKIE: &str = "session";

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - GET /auth/google - Redirect to Google
/// - GET /auth/google/callback - OAuth callback
/// - POST /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/google", get(google_redirect))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", axum::routing::post(logout))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Renders a simple login page with a Google sign-in button.
async fn login_page() -> impl IntoResponse {
    Html(
        r#"
        <!DOCTYPE html>
        <html>
        <head><title>Login - StudioPay</title></head>
        <body>
            <h1>StudioPay</h1>
            <p>Please sign in with Google</p>
            <a href="/auth/google">Sign in with Google</a>
        </body>
        </html>
    "#,
    )
}

// =============================================================================
// Google OAuth
// =============================================================================

/// GET /auth/google
///
/// Redirects user to Google's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect to Google with client_id, redirect_uri, scope, state
async fn google_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let csrf_state = generate_csrf_state();

    let mut authorize_url = url::Url::parse(GOOGLE_AUTH_URL)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid authorize URL: {e}")))?;
    authorize_url
        .query_pairs_mut()
        .append_pair("client_id", &state.config.auth.google.client_id)
        .append_pair("redirect_uri", &callback_url(&state))
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", &csrf_state);

    let state_cookie = Cookie::build((STATE_COOKIE, csrf_state))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(state_cookie), Redirect::to(authorize_url.as_str())))
}

/// Query parameters from Google callback
#[derive(Debug, Deserialize)]
struct GoogleCallbackQuery {
    /// Authorization code
    code: String,
    /// CSRF state token
    state: String,
}

/// Google token response
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Google user info (OpenID Connect userinfo)
#[derive(Debug, Deserialize)]
struct GoogleUser {
    /// Stable opaque subject identifier
    sub: String,
    email: String,
    name: Option<String>,
}

/// GET /auth/google/callback
///
/// Handles OAuth callback from Google.
///
/// # Steps
/// 1. Verify CSRF state
/// 2. Exchange code for access token
/// 3. Fetch user info from Google
/// 4. Create or refresh the profile (admin flag from configuration)
/// 5. Create session and set cookie
/// 6. Redirect to home
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    verify_csrf_state(&query.state, &jar)?;

    // Exchange authorization code for access token
    let token_response: GoogleTokenResponse = state
        .http_client
        .post(GOOGLE_TOKEN_URL)
        .form(&[
            ("client_id", state.config.auth.google.client_id.as_str()),
            (
                "client_secret",
                state.config.auth.google.client_secret.as_str(),
            ),
            ("code", query.code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", callback_url(&state).as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Fetch the authenticated identity
    let user: GoogleUser = state
        .http_client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(&token_response.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Admin capability is decided by server configuration, never by the client
    let is_admin = state.config.auth.is_admin_email(&user.email);
    let profile = state
        .db
        .upsert_profile_on_login(&user.sub, &user.email, user.name.as_deref(), is_admin)
        .await?;

    tracing::info!(
        user_id = %profile.user_id,
        email = %profile.email,
        is_admin = profile.is_admin,
        "User signed in"
    );

    let now = Utc::now();
    let session = Session {
        user_id: user.sub,
        email: user.email,
        name: user.name,
        created_at: now,
        expires_at: now + Duration::seconds(state.config.auth.session_max_age),
    };
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    // Expiry is enforced by the signed token itself, not the cookie.
    let session_cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .same_site(SameSite::Lax)
        .build();

    let jar = jar
        .remove(Cookie::from(STATE_COOKIE))
        .add(session_cookie);

    Ok((jar, Redirect::to("/")))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Clears session cookie and redirects to login.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Redirect::to("/login"))
}

// =============================================================================
// Helpers
// =============================================================================

fn callback_url(state: &AppState) -> String {
    format!("{}/auth/google/callback", state.config.server.base_url())
}

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    use base64::{Engine as _, engine::general_purpose};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(state: &str, jar: &CookieJar) -> Result<(), AppError> {
    let cookie_state = jar.get(STATE_COOKIE).ok_or(AppError::Unauthorized)?;
    if cookie_state.value() != state {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
