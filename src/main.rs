mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod dataset;
mod config;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use crate::routes::roi_routes::api_routes;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;
use crate::api_docs::ApiDoc;
use crate::shared_state::SharedState;
use crate::config::Config;
use crate::dataset::ReferenceDataset;

use tower_http::services::ServeDir;

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = match Config::load("config.json") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config.json: {}", e);
            return;
        }
    };

    // 2. Load the reference dataset (fatal when missing or malformed);
    //    it stays immutable for the rest of the process lifetime
    let dataset = match ReferenceDataset::load(&config.dataset.path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!(
                "Failed to load reference data from {}: {}",
                config.dataset.path, e
            );
            return;
        }
    };
    println!(
        "[DATASET] {} locations across {} countries loaded from {}",
        dataset.len(),
        dataset.country_count(),
        config.dataset.path
    );

    // 3. Shared state for the API handlers
    let server_port = config.server.port;
    let shared = SharedState::new(config, dataset);

    // 4. Start Axum HTTP server: JSON API + Scalar UI + static frontend
    let app = Router::new()
        .nest("/api", api_routes(shared))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"));

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    println!("API Server listening on http://{}", addr);
    println!("Scalar UI: http://{}/scalar", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
