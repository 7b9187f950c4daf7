//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, UserDTO};
use crate::entities::User;
use crate::repositories::{Create, NewUser};
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

lazy_static! {
    static ref HAS_DIGIT: Regex = Regex::new(r"[0-9]").expect("static regex");
    static ref HAS_LETTER: Regex = Regex::new(r"[A-Za-z]").expect("static regex");
}

/// Una password deve contenere almeno una lettera e almeno una cifra
fn is_strong_password(password: &str) -> bool {
    HAS_DIGIT.is_match(password) && HAS_LETTER.is_match(password)
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value).map_err(|e| {
        error!("Invalid header value: {:?}", e);
        AppError::internal_server_error("Failed to build response headers")
    })
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Verificare che email e password siano presenti (fail-fast prima della lookup)
    // 2. Cercare l'utente tramite email, se non esiste ritornare UNAUTHORIZED
    // 3. Verificare la password contro l'hash memorizzato
    // 4. Generare un token JWT con id ed email dell'utente
    // 5. Costruire un cookie HttpOnly, Secure, SameSite=Lax con il token e la durata configurata
    // 6. Ritornare StatusCode::OK con Set-Cookie e Authorization (Bearer token)

    if body.email.trim().is_empty() || body.password.is_empty() {
        warn!("Empty credentials");
        return Err(AppError::unauthorized("Email or password are not correct"));
    }

    let user = state.user.find_by_email(&body.email).ok_or_else(|| {
        warn!("Unknown email");
        AppError::unauthorized("Email or password are not correct")
    })?;

    if !user.verify_password(&body.password) {
        warn!("Wrong password for user {}", user.user_id);
        return Err(AppError::unauthorized("Email or password are not correct"));
    }

    let token = encode_jwt(
        user.email.clone(),
        user.user_id.0,
        &state.jwt_secret,
        state.jwt_ttl_hours,
    )?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        state.jwt_ttl_hours * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, header_value(&cookie_value)?);
    headers.insert(
        header::AUTHORIZATION,
        header_value(&format!("Bearer {}", token))?,
    );

    info!(user_id = %user.user_id, "User logged in");
    Ok((StatusCode::OK, headers, Json(UserDTO::from(user))))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>, // JSON body
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    debug!("Registering new user");
    // 1. Validare il DTO con validator (formato email, lunghezze)
    // 2. Verificare che la password contenga lettere e cifre
    // 3. Generare l'hash della password
    // 4. Salvare il nuovo utente, la directory rifiuta le email già usate (CONFLICT)
    // 5. Ritornare CREATED con il DTO dell'utente

    body.validate()?;

    if !is_strong_password(&body.password) {
        warn!("Weak password rejected");
        return Err(AppError::bad_request("Validation error")
            .with_details("password must contain at least one letter and one digit"));
    }

    let password_hash = User::hash_password(&body.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        AppError::internal_server_error("Failed to hash password")
    })?;

    let created_user = state
        .user
        .create(NewUser {
            email: body.email,
            display_name: body.display_name,
            password_hash,
        })
        .await
        .map_err(|e| {
            warn!("Registration rejected: {}", e);
            AppError::from(e)
        })?;

    info!(user_id = %created_user.user_id, "User registered");
    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}
