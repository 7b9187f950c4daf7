use carpool_server::config::Config;
use carpool_server::geocoding::{Gazetteer, Geocoder};
use carpool_server::{AppState, create_router_with_cors};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Caricare la configurazione (.env + variabili d'ambiente)
    let config = Config::from_env()?;

    // 2. Inizializzare il logging, RUST_LOG ha la precedenza su LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.print_info();

    // 3. Caricare il gazetteer per la ricerca destinazioni, vuoto se non configurato
    let gazetteer = match &config.gazetteer_path {
        Some(path) => match Gazetteer::from_json_file(path) {
            Ok(gazetteer) if gazetteer.is_empty() => {
                warn!("Gazetteer {} lists no places, destination search will return no suggestions", path);
                gazetteer
            }
            Ok(gazetteer) => {
                info!("Loaded {} places from {}", gazetteer.len(), path);
                gazetteer
            }
            Err(e) => {
                error!("Cannot load gazetteer {}: {}", path, e);
                return Err(e.into());
            }
        },
        None => {
            warn!("No gazetteer configured, destination search will return no suggestions");
            Gazetteer::new(Vec::new())
        }
    };
    let geocoder: Arc<dyn Geocoder> = Arc::new(gazetteer);

    // 4. Costruire lo stato condiviso e il router
    let state = Arc::new(AppState::from_config(&config, geocoder));
    let app = create_router_with_cors(state, config.cors_allow_any);

    // 5. Avviare il server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
