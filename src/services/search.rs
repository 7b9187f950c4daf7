//! Search services - Ricerca delle destinazioni tramite il provider di geocoding

use crate::core::{AppError, AppState};
use crate::dtos::SearchQuery;
use crate::geocoding::SearchOutcome;
use axum::extract::{Json, Query, State};
use std::sync::Arc;
use tracing::{debug, instrument};

#[instrument(skip(state), fields(query = %params.query))]
pub async fn search_destinations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>, // query params /search?query=...
) -> Result<Json<SearchOutcome>, AppError> {
    // L'esito (suggerimenti, risultato o errore del provider) viene girato
    // al client così com'è: un errore del provider non è un errore HTTP
    let outcome = state.geocoder.search(&params.query).await;
    debug!(?outcome, "Geocoder answered");
    Ok(Json(outcome))
}
