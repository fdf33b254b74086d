use log::{error, info, warn};
use std::net::SocketAddr;

use launchpad_admin::app::{connect_store, AppState};
use launchpad_admin::config::ServerConfig;
use launchpad_admin::handlers::routes;
use launchpad_admin::storage::token_revocation::start_cleanup_task;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("No .env file loaded: {}", e),
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, db={}, tls={}",
        config.host, config.port, config.db_name, config.enable_tls
    );

    let store = match connect_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open document store: {}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::new(config, store) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(revocation) = &state.revocation {
        start_cleanup_task(revocation.clone());
    }

    let config = state.config.clone();
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    let routes = routes(state);

    match (&config.tls_cert_path, &config.tls_key_path) {
        (Some(cert_path), Some(key_path)) if config.enable_tls => {
            info!("Starting Launchpad Admin server on https://{}", addr);
            warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .run(addr)
                .await;
        }
        _ => {
            if config.production {
                warn!("SECURITY: serving plain HTTP in production, terminate TLS upstream");
            }
            info!("Starting Launchpad Admin server on http://{}", addr);
            warp::serve(routes).run(addr).await;
        }
    }
}
