#![allow(dead_code)]

use axum_test::TestServer;
use axum_test::http::HeaderName;
use carpool_server::core::{AppState, encode_jwt};
use carpool_server::entities::{Destination, User};
use carpool_server::geocoding::Gazetteer;
use carpool_server::repositories::{Create, NewUser};
use serde_json::{Value, json};
use std::sync::Arc;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test con un piccolo gazetteer
///
/// # Returns
/// Arc<AppState> configurato con il JWT secret di test
pub fn create_test_state() -> Arc<AppState> {
    let gazetteer = Gazetteer::new(vec![
        Destination::new("School", -122.41, 37.77),
        Destination::new("Schoolhouse Park", -122.40, 37.76),
        Destination::new("Lincoln High School", -122.50, 37.74),
        Destination::new("Airport", -122.38, 37.62),
    ]);
    Arc::new(AppState::new(
        Arc::new(gazetteer),
        JWT_SECRET.to_string(),
        24,
    ))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = carpool_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `email` - Email dell'utente
///
/// # Returns
/// Token JWT valido per 24 ore
pub fn create_test_jwt(user_id: i32, email: &str) -> String {
    encode_jwt(email.to_string(), user_id, JWT_SECRET, 24).expect("Failed to create JWT token")
}

/// Registra un utente direttamente nella directory (senza passare da bcrypt)
/// e ritorna l'utente con un token valido
pub async fn create_test_user(state: &AppState, email: &str, display_name: &str) -> (User, String) {
    let user = state
        .user
        .create(NewUser {
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect("Failed to create test user");
    let token = create_test_jwt(user.user_id.0, &user.email);
    (user, token)
}

pub fn auth_header() -> HeaderName {
    HeaderName::from_static("authorization")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Body per pubblicare un carpool non ricorrente alle 10:00
pub fn carpool_body(title: &str, destination: &str) -> Value {
    json!({
        "title": title,
        "destination": {
            "label": destination,
            "coordinate": { "longitude": -122.41, "latitude": 37.77 }
        },
        "schedule": { "repeating": false, "hour": 10, "minute": 0 }
    })
}

/// Pubblica un carpool via HTTP e ritorna il suo id
pub async fn publish_carpool(server: &TestServer, token: &str, title: &str, destination: &str) -> u64 {
    let response = server
        .post("/carpools")
        .add_header(auth_header(), bearer(token))
        .json(&carpool_body(title, destination))
        .await;
    let carpool: Value = response.json();
    carpool["carpool_id"]
        .as_u64()
        .expect("carpool_id should be a number")
}
