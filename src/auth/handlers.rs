use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::PageUser,
        repo_types::NewUser,
        services::{hash_password, validate_registration, verify_password, JwtKeys, INVALID_CREDENTIALS},
    },
    config::TOKEN_COOKIE,
    error::AppError,
    state::AppState,
    templates::{render, RegisterTemplate},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/register", get(register_page))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/logout", post(logout))
}

/// Sends signed-in visitors to the listing, everybody else to the login page.
async fn root(user: Option<PageUser>) -> Redirect {
    match user {
        Some(_) => Redirect::to("/index"),
        None => Redirect::to("/register"),
    }
}

pub async fn register_page() -> Result<Html<String>, AppError> {
    render(&RegisterTemplate::blank())
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let page_error = |message: &str| -> Result<Response, AppError> {
        Ok(render(&RegisterTemplate::with_error(message))?.into_response())
    };

    if let Err(message) = validate_registration(&form) {
        warn!(reason = message, "registration rejected");
        return page_error(message);
    }

    match state
        .store
        .username_or_email_taken(&form.username, &form.email)
        .await
    {
        Ok(false) => {}
        Ok(true) => {
            warn!("username or email already registered");
            return page_error("Ce nom d'utilisateur ou cet email est déjà utilisé");
        }
        Err(e) => {
            error!(error = %e, "duplicate check failed");
            return page_error("Erreur lors de la vérification de l'utilisateur");
        }
    }

    let password_hash = match hash_password(&form.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return page_error("Erreur lors du hachage du mot de passe");
        }
    };

    let new_user = NewUser {
        username: form.username,
        mail: form.email,
        password_hash,
    };
    match state.store.create_user(new_user).await {
        Ok(user_id) => {
            info!(user_id, "user registered");
            Ok(Redirect::to("/register").into_response())
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            page_error("Erreur lors de la création de l'utilisateur")
        }
    }
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": INVALID_CREDENTIALS })),
    )
        .into_response()
}

#[instrument(skip(state, jar, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest("Tous les champs sont requis".into()));
    }

    let user = match state.store.find_user_by_username(&form.username).await? {
        Some(u) => u,
        None => {
            warn!("login unknown username");
            return Ok(invalid_credentials());
        }
    };

    match verify_password(&form.password, &user.password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = user.user_id, "login invalid password");
            return Ok(invalid_credentials());
        }
        Err(e) => {
            error!(error = %e, user_id = user.user_id, "stored password hash unreadable");
            return Ok(invalid_credentials());
        }
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys
        .issue(user.user_id, &user.username)
        .map_err(|e| AppError::Internal(format!("jwt sign failed: {e}")))?;

    if let Err(e) = state.store.touch_last_connection(user.user_id).await {
        error!(error = %e, user_id = user.user_id, "updating last connection failed");
    }

    let cookie = Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.secure_cookies)
        .expires(keys.expires_at());

    info!(user_id = user.user_id, "user logged in");
    Ok((jar.add(cookie), Redirect::to("/index")).into_response())
}

/// Drops the cookie only; the token itself stays valid until it expires.
#[instrument(skip(jar, user), fields(user_id = user.0.id))]
pub async fn logout(user: PageUser, jar: CookieJar) -> impl IntoResponse {
    info!("user logged out");
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, Redirect::to("/register"))
}
