//! User services - Profilo e cancellazione account

use crate::core::{AppError, AppState};
use crate::dtos::UserDTO;
use crate::entities::User;
use crate::repositories::Delete;
use axum::{
    Extension,
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn get_me(
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
) -> Result<Json<UserDTO>, AppError> {
    debug!("Fetching current profile");
    Ok(Json(UserDTO::from(current_user)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, email = %current_user.email))]
pub async fn delete_my_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
) -> Result<impl IntoResponse, AppError> {
    info!("User account deletion initiated");
    // 1. Ottenere l'utente corrente dall'Extension (autenticato tramite JWT)
    // 2. Rimuovere l'utente dalla directory: da qui il middleware rifiuta i suoi token
    // 3. Eliminare i carpool di cui è owner e toglierlo da membri e richieste degli altri;
    //    le richieste già passate dal middleware vengono rifiutate dalla directory
    //    e ogni carpool toccato notifica i propri osservatori
    // 4. Creare un cookie con Max-Age=0 per forzare il logout lato client
    // 5. Ritornare StatusCode::OK con gli headers e messaggio
    state.user.delete(&current_user.user_id).await?;

    let report = state.carpools.purge_user(current_user.user_id).await;
    debug!(
        "Cascade removed {} carpools and updated {}",
        report.removed.len(),
        report.updated.len()
    );

    let cookie = "token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, HeaderValue::from_static(cookie));

    info!("Account deleted successfully");
    Ok((StatusCode::OK, headers, "Account deleted successfully"))
}
