use crate::core::{AppError, AppState};
use crate::entities::{Carpool, UserId};
use crate::repositories::Read;
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// struct che codifica il contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub email: String,
}

#[instrument(skip(secret), fields(email = %email, id = %id))]
pub fn encode_jwt(email: String, id: i32, secret: &str, ttl_hours: i64) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire: chrono::TimeDelta = Duration::hours(ttl_hours);
    let exp: usize = (now + expire).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims { iat, exp, email, id };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.id);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden(
                "Please add the JWT token to the header",
            ));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            warn!("Malformed authorization header");
            return Err(AppError::forbidden("Expected a Bearer token"));
        }
    };

    let token_data = match decode_jwt(token, &state.jwt_secret) {
        Ok(data) => data,
        Err(_) => {
            return Err(AppError::unauthorized("Unable to decode token"));
        }
    };

    // L'account potrebbe essere stato cancellato dopo l'emissione del token
    let current_user = match state.user.read(&UserId(token_data.claims.id)).await {
        Some(user) => {
            debug!("User authenticated: {}", user.user_id);
            user
        }
        None => {
            warn!("User not found: {}", token_data.claims.id);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    req.extensions_mut().insert(current_user);
    // volendo si può recuperare lo user da extension
    Ok(next.run(req).await)
}

/// Helper per le azioni riservate all'owner (modifica, cancellazione,
/// approvazione e rifiuto delle richieste)
///
/// # Returns
/// * `Ok(())` se `user` è l'owner del carpool
/// * `Err(AppError)` con 403 altrimenti
#[instrument(skip(carpool), fields(carpool_id = %carpool.id, user_id = %user))]
pub fn require_owner(carpool: &Carpool, user: UserId) -> Result<(), AppError> {
    if !carpool.is_owner(user) {
        warn!("User {} is not the owner of carpool {}", user, carpool.id);
        return Err(AppError::forbidden("Only the owner can do this"));
    }
    debug!("Owner check passed");
    Ok(())
}
