use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::controllers::roi_controller::{
    // Reference data & map
    list_locations, list_countries, list_cities, map_markers,
    // Calculation & report
    calculate, compare, report,
    // Frontend support
    ui_animation, system_info,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract `State<Arc<ReferenceDataset>>` and/or `State<Config>` via
/// `FromRef<SharedState>` — a single `.with_state(shared)` covers both.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/locations",                   get(list_locations))
        .route("/locations/countries",         get(list_countries))
        .route("/locations/{country}/cities",  get(list_cities))
        .route("/map/markers",                 get(map_markers))
        .route("/roi/calculate",               post(calculate))
        .route("/roi/compare",                 post(compare))
        .route("/roi/report",                  post(report))
        .route("/ui/animation",                get(ui_animation))
        .route("/system/info",                 get(system_info))
        .layer(CorsLayer::permissive())
        .with_state(shared)
}
