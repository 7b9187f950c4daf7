//! Carpool services - Pubblicazione, consultazione e gestione dei carpool

use crate::core::{AppError, AppState, require_owner};
use crate::dtos::{CarpoolDTO, CarpoolQuery, CreateCarpoolDTO, SearchQuery, UpdateCarpoolDTO};
use crate::entities::{CarpoolChanges, CarpoolId, Schedule, User};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_carpools(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Result<Json<Vec<CarpoolDTO>>, AppError> {
    debug!("Listing carpools for user");
    // 1. Ottenere l'utente corrente dall'Extension
    // 2. Recuperare i carpool di cui è owner o membro (le richieste pendenti non contano)
    // 3. Convertire in CarpoolDTO dal punto di vista dell'utente
    let carpools = state.carpools.list_for_user(current_user.user_id);
    info!("Found {} carpools for user", carpools.len());

    Ok(Json(
        carpools
            .iter()
            .map(|c| CarpoolDTO::for_viewer(c, current_user.user_id))
            .collect(),
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_carpool(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateCarpoolDTO>,
) -> Result<(StatusCode, Json<CarpoolDTO>), AppError> {
    debug!("Publishing new carpool");
    // 1. Validare il DTO (lunghezza titolo)
    // 2. Convertire l'orario, rispettando l'invariante giorni/ripetizione
    // 3. Creare il carpool con owner = utente corrente (titolo vuoto o destinazione mancante -> 400)
    // 4. Ritornare CREATED con il DTO del carpool
    body.validate()?;

    let schedule = Schedule::try_from(body.schedule)?;
    let carpool = state.carpools.create(
        current_user.user_id,
        &body.title,
        body.destination,
        schedule,
    )?;

    info!(carpool_id = %carpool.id, "Carpool published");
    Ok((
        StatusCode::CREATED,
        Json(CarpoolDTO::for_viewer(&carpool, current_user.user_id)),
    ))
}

#[instrument(skip(state, current_user), fields(query = %params.query))]
pub async fn discover_carpools(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>, // query params /carpools/discover?query=...
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<CarpoolDTO>>, AppError> {
    debug!("Searching carpool directory");
    // 1. Estrarre il testo di ricerca (vuoto = tutti i carpool)
    // 2. Cercare su titolo ed etichetta della destinazione, senza distinzione di maiuscole
    // 3. Convertire in CarpoolDTO dal punto di vista dell'utente
    let carpools = state.carpools.search(&params.query);
    info!("Found {} carpools matching search", carpools.len());

    Ok(Json(
        carpools
            .iter()
            .map(|c| CarpoolDTO::for_viewer(c, current_user.user_id))
            .collect(),
    ))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn get_carpool(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Query(params): Query<CarpoolQuery>, // /carpools/{id}?known_revision=N
    Extension(current_user): Extension<User>,
) -> Result<Response, AppError> {
    debug!("Fetching carpool");
    // 1. Recuperare lo snapshot corrente del carpool (NOT_FOUND se cancellato)
    // 2. Se il client conosce già questa revisione, ritornare NOT_MODIFIED senza body
    // 3. Altrimenti ritornare il DTO aggiornato
    let carpool = state.carpools.get(carpool_id)?;

    if params.known_revision == Some(carpool.revision()) {
        debug!(revision = carpool.revision(), "Client projection is up to date");
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok(Json(CarpoolDTO::for_viewer(&carpool, current_user.user_id)).into_response())
}

#[instrument(skip(state, current_user, body), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn update_carpool(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateCarpoolDTO>,
) -> Result<Json<CarpoolDTO>, AppError> {
    debug!("Editing carpool");
    // 1. Verificare che il carpool esista e che l'utente ne sia l'owner
    // 2. Validare e convertire le modifiche
    // 3. Applicare le modifiche (la revisione cresce solo se qualcosa cambia)
    // 4. Gli osservatori vengono notificati dalla directory se la revisione è cambiata
    let before = state.carpools.get(carpool_id)?;
    require_owner(&before, current_user.user_id)?;

    body.validate()?;
    let changes = CarpoolChanges::try_from(body)?;

    let updated = state.carpools.update(carpool_id, changes).await?;
    if updated.revision() == before.revision() {
        debug!("Nothing changed");
    }

    Ok(Json(CarpoolDTO::for_viewer(&updated, current_user.user_id)))
}

#[instrument(skip(state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn delete_carpool(
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    info!("Carpool deletion requested");
    // 1. Verificare che il carpool esista e che l'utente ne sia l'owner
    // 2. Rimuovere il carpool (le transizioni successive vedranno NOT_FOUND);
    //    gli osservatori ricevono `deleted` e il feed viene chiuso
    let carpool = state.carpools.get(carpool_id)?;
    require_owner(&carpool, current_user.user_id)?;

    let removed = state.carpools.remove(carpool_id).await.map_err(|e| {
        warn!("Carpool vanished before deletion: {}", e);
        AppError::from(e)
    })?;

    info!(revision = removed.revision(), "Carpool deleted");
    Ok(StatusCode::NO_CONTENT)
}
