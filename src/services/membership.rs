//! Membership services - Richieste di partecipazione ai carpool
//!
//! `join`, `cancel` e `leave` sono azioni dell'utente su se stesso;
//! `approve` e `decline` sono riservate all'owner e agiscono su un altro utente.

use crate::core::{AppError, AppState, require_owner};
use crate::dtos::{MembershipDTO, PendingRequestDTO};
use crate::entities::{CarpoolId, Transition, User, UserId};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Applica la transizione; se lo stato cambia la directory notifica gli osservatori
async fn apply_membership(
    state: &AppState,
    carpool_id: CarpoolId,
    user_id: UserId,
    transition: Transition,
) -> Result<MembershipDTO, AppError> {
    let result = state
        .carpools
        .apply_transition(carpool_id, user_id, transition)
        .await?;
    Ok(MembershipDTO::new(carpool_id, user_id, result))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn join_carpool(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Result<Json<MembershipDTO>, AppError> {
    debug!("Join requested");
    // 1. Ottenere l'utente corrente dall'Extension
    // 2. Applicare Join: NONE -> PENDING, ripetuta su PENDING non cambia nulla
    // 3. Ritornare il nuovo stato con la revisione
    let membership = apply_membership(&state, carpool_id, current_user.user_id, Transition::Join).await?;
    info!(state = %membership.state, "Join request processed");
    Ok(Json(membership))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MembershipDTO>, AppError> {
    debug!("Cancel requested");
    // PENDING -> NONE; ripetuta su NONE non cambia nulla, da MEMBER è una transizione non valida
    let membership = apply_membership(&state, carpool_id, current_user.user_id, Transition::Cancel).await?;
    Ok(Json(membership))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn leave_carpool(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MembershipDTO>, AppError> {
    debug!("Leave requested");
    // MEMBER -> NONE
    let membership = apply_membership(&state, carpool_id, current_user.user_id, Transition::Leave).await?;
    info!("User left carpool");
    Ok(Json(membership))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<PendingRequestDTO>>, AppError> {
    debug!("Listing pending requests");
    // 1. Verificare che il carpool esista e che l'utente ne sia l'owner
    // 2. Per ogni richiesta pendente recuperare il nome dell'utente
    // 3. Ritornare la lista in ordine di user_id
    let carpool = state.carpools.get(carpool_id)?;
    require_owner(&carpool, current_user.user_id)?;

    let lookups = carpool
        .pending_requests()
        .iter()
        .map(|user_id| state.user.read(user_id));
    let users = futures::future::join_all(lookups).await;

    let requests: Vec<PendingRequestDTO> = carpool
        .pending_requests()
        .iter()
        .zip(users)
        .map(|(user_id, user)| PendingRequestDTO {
            user_id: *user_id,
            display_name: user.map(|u| u.display_name),
        })
        .collect();

    info!("Found {} pending requests", requests.len());
    Ok(Json(requests))
}

#[debug_handler]
#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, owner = %current_user.user_id, target_user = %user_id))]
pub async fn respond_to_request(
    State(state): State<Arc<AppState>>,
    Path((carpool_id, user_id, action)): Path<(CarpoolId, UserId, String)>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MembershipDTO>, AppError> {
    debug!("Responding to join request");
    // 1. Estrarre carpool_id, user_id e action (approve/decline) dal path
    // 2. Validare action
    // 3. Verificare che l'utente corrente sia l'owner (l'owner non cambia mai,
    //    lo snapshot letto qui resta valido anche se la membership cambia nel frattempo)
    // 4. Applicare la transizione sull'utente target
    // 5. Ritornare il nuovo stato del target
    let transition = match action.as_str() {
        "approve" => Transition::Approve,
        "decline" => Transition::Decline,
        _ => {
            warn!("Invalid request action: {}", action);
            return Err(AppError::bad_request("Action must be 'approve' or 'decline'"));
        }
    };
    debug_assert!(transition.requires_owner());

    let carpool = state.carpools.get(carpool_id)?;
    require_owner(&carpool, current_user.user_id)?;

    let membership = apply_membership(&state, carpool_id, user_id, transition).await?;
    info!(state = %membership.state, "Request {}d", transition);
    Ok(Json(membership))
}
