use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::config::Config;
use crate::dataset::ReferenceDataset;
use crate::models::roi::{
    CalculationOutcome, CompareQuery, DisplayCurrency, LocationRecord, MapMarker, RoiQuery,
    RoiRequest, RoiResult, SystemInfo,
};
use crate::services::{lottie_service, report_pdf, roi_engine};

// Form minimums, mirrored by the frontend inputs
const MIN_SYSTEM_SIZE_KW: f64 = 1.0;
const MIN_SYSTEM_COST_USD: f64 = 1000.0;

fn validate_inputs(system_size_kw: f64, system_cost_usd: f64) -> Result<(), &'static str> {
    if !system_size_kw.is_finite() || system_size_kw < MIN_SYSTEM_SIZE_KW {
        return Err("System size must be at least 1 kW");
    }
    if !system_cost_usd.is_finite() || system_cost_usd < MIN_SYSTEM_COST_USD {
        return Err("System cost must be at least 1000 USD");
    }
    Ok(())
}

/// Validate, look up and evaluate one single-location query. Shared by the
/// calculate and report endpoints so both answer identically for bad input.
fn evaluate_single(dataset: &ReferenceDataset, query: &RoiQuery) -> Result<RoiResult, Response> {
    if let Err(message) = validate_inputs(query.system_size_kw, query.system_cost_usd) {
        return Err(
            (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response(),
        );
    }
    let Some(record) = dataset.get(&query.country, &query.city) else {
        return Err(
            (StatusCode::NOT_FOUND, Json(json!({"error": "Location not found"}))).into_response(),
        );
    };
    let request = RoiRequest {
        system_size_kw: query.system_size_kw,
        system_cost_usd: query.system_cost_usd,
        display_currency: DisplayCurrency::from_code(&query.display_currency),
    };
    Ok(roi_engine::evaluate(record, &request, Utc::now()))
}

/// GET /api/locations
/// List the full reference dataset
///
/// Returns every location row: irradiance, tariff, incentive, policy text, currency metadata and map coordinates.
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All reference locations", body = Vec<LocationRecord>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_locations(State(dataset): State<Arc<ReferenceDataset>>) -> impl IntoResponse {
    Json(dataset.all()).into_response()
}

/// GET /api/locations/countries
/// List available countries
///
/// Countries appear in dataset order, deduplicated. Drives the country select of the form.
#[utoipa::path(
    get,
    path = "/api/locations/countries",
    responses(
        (status = 200, description = "Available countries", body = Vec<String>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_countries(State(dataset): State<Arc<ReferenceDataset>>) -> impl IntoResponse {
    Json(dataset.countries()).into_response()
}

/// GET /api/locations/{country}/cities
/// List the cities of one country
///
/// Cities appear in dataset order. Drives the dependent city select of the form.
#[utoipa::path(
    get,
    path = "/api/locations/{country}/cities",
    params(
        ("country" = String, Path, description = "Country name, exact match")
    ),
    responses(
        (status = 200, description = "Cities of the country", body = Vec<String>),
        (status = 404, description = "Country not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_cities(
    Path(country): Path<String>,
    State(dataset): State<Arc<ReferenceDataset>>,
) -> impl IntoResponse {
    let cities = dataset.cities_in(&country);
    if cities.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Country not found"})),
        )
            .into_response();
    }
    Json(cities).into_response()
}

/// GET /api/map/markers
/// Markers for the all-locations map
///
/// One marker per dataset row with the tooltip fields, independent of any user selection.
#[utoipa::path(
    get,
    path = "/api/map/markers",
    responses(
        (status = 200, description = "Map markers for every location", body = Vec<MapMarker>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn map_markers(State(dataset): State<Arc<ReferenceDataset>>) -> impl IntoResponse {
    let markers: Vec<MapMarker> = dataset
        .all()
        .iter()
        .map(|record| MapMarker {
            country: record.country.clone(),
            city: record.city.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            ghi_daily: record.ghi_daily,
            tariff_usd_per_kwh: record.tariff_usd_per_kwh,
            policy_summary: record.policy_summary.clone(),
            currency_code: record.currency_code.clone(),
            usd_to_local_rate: record.usd_to_local_rate,
        })
        .collect();
    Json(markers).into_response()
}

/// POST /api/roi/calculate
/// Evaluate one location
///
/// Runs the ROI calculation for the selected city and returns a `single` outcome.
/// A blank selection yields an `empty` outcome with a warning instead of an error.
#[utoipa::path(
    post,
    path = "/api/roi/calculate",
    request_body = RoiQuery,
    responses(
        (status = 200, description = "Calculation outcome", body = CalculationOutcome),
        (status = 400, description = "System size or cost below the form minimum"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn calculate(
    State(dataset): State<Arc<ReferenceDataset>>,
    Json(query): Json<RoiQuery>,
) -> impl IntoResponse {
    #[cfg(feature = "verbose_log")]
    println!(
        "[ROI] {} / {} | {} kW | {} USD | display {}",
        query.country, query.city, query.system_size_kw, query.system_cost_usd,
        query.display_currency
    );

    if query.country.trim().is_empty() || query.city.trim().is_empty() {
        return Json(CalculationOutcome::Empty {
            warning: "Please select a city.".to_string(),
        })
        .into_response();
    }
    match evaluate_single(&dataset, &query) {
        Ok(result) => Json(CalculationOutcome::Single { result }).into_response(),
        Err(response) => response,
    }
}

/// POST /api/roi/compare
/// Evaluate several cities of one country
///
/// Runs the same investment parameters over every selected city and returns a `batch`
/// outcome in selection order. Cities without reference data are skipped and reported
/// in `warnings`; an empty selection yields an `empty` outcome.
#[utoipa::path(
    post,
    path = "/api/roi/compare",
    request_body = CompareQuery,
    responses(
        (status = 200, description = "Batch calculation outcome", body = CalculationOutcome),
        (status = 400, description = "System size or cost below the form minimum"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn compare(
    State(dataset): State<Arc<ReferenceDataset>>,
    Json(query): Json<CompareQuery>,
) -> impl IntoResponse {
    if query.cities.is_empty() {
        return Json(CalculationOutcome::Empty {
            warning: "Please select at least one city in Compare Mode.".to_string(),
        })
        .into_response();
    }
    if let Err(message) = validate_inputs(query.system_size_kw, query.system_cost_usd) {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response();
    }

    let request = RoiRequest {
        system_size_kw: query.system_size_kw,
        system_cost_usd: query.system_cost_usd,
        display_currency: DisplayCurrency::from_code(&query.display_currency),
    };

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for city in &query.cities {
        match dataset.get(&query.country, city) {
            Some(record) => records.push(record),
            None => warnings.push(format!("No reference data for {city}; skipped.")),
        }
    }

    let results = roi_engine::evaluate_many(&records, &request, Utc::now());
    Json(CalculationOutcome::Batch { results, warnings }).into_response()
}

/// POST /api/roi/report
/// Download the PDF summary for one location
///
/// Recomputes the result for the posted query (the server keeps no result state)
/// and streams a one-page PDF named `Solar_Report_{country}_{city}.pdf`.
#[utoipa::path(
    post,
    path = "/api/roi/report",
    request_body = RoiQuery,
    responses(
        (status = 200, description = "PDF report download"),
        (status = 400, description = "System size or cost below the form minimum"),
        (status = 404, description = "Location not found"),
        (status = 500, description = "Report rendering failed")
    )
)]
pub async fn report(
    State(dataset): State<Arc<ReferenceDataset>>,
    Json(query): Json<RoiQuery>,
) -> impl IntoResponse {
    let result = match evaluate_single(&dataset, &query) {
        Ok(result) => result,
        Err(response) => return response,
    };
    match report_pdf::render(&result) {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", result.report_file_name);
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            eprintln!("Failed to render report for {}/{}: {}", query.country, query.city, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to render report"})),
            )
                .into_response()
        }
    }
}

/// GET /api/ui/animation
/// Header animation for the frontend
///
/// Proxies the configured Lottie JSON. Decorative only: when no URL is configured
/// or the upstream fetch fails the endpoint answers 204 and the page renders without it.
#[utoipa::path(
    get,
    path = "/api/ui/animation",
    responses(
        (status = 200, description = "Lottie animation JSON"),
        (status = 204, description = "No animation configured or upstream unavailable")
    )
)]
pub async fn ui_animation(State(config): State<Config>) -> impl IntoResponse {
    let Some(url) = config.ui.animation_url else {
        return StatusCode::NO_CONTENT.into_response();
    };
    match lottie_service::fetch_animation(&url).await {
        Some(animation) => Json(animation).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /api/system/info
/// Build and dataset summary
///
/// Version, dataset counts, the fixed performance ratio and the exchange-rate basis.
#[utoipa::path(
    get,
    path = "/api/system/info",
    responses(
        (status = 200, description = "System information", body = SystemInfo),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn system_info(State(dataset): State<Arc<ReferenceDataset>>) -> impl IntoResponse {
    Json(SystemInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        location_count: dataset.len(),
        country_count: dataset.country_count(),
        performance_ratio: roi_engine::PERFORMANCE_RATIO,
        exchange_rate_basis: "static dataset rates".to_string(),
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    fn dataset() -> Arc<ReferenceDataset> {
        let rows = "Country,City,GHI_Daily,Tariff_USD_kWh,Incentive_Type,Incentive_Value_USD,Policy_Summary,Local_Currency_Code,Local_Currency_Symbol,USD_to_Local_Rate,Latitude,Longitude\n\
                    UAE,Dubai,5.8,0.08,Net_Metering,0,Net metering credits,AED,Dh,3.67,25.2,55.27\n\
                    UAE,Abu Dhabi,5.9,0.077,None,0,No dedicated incentive,AED,Dh,3.67,24.45,54.38\n";
        Arc::new(ReferenceDataset::from_reader(rows.as_bytes()).unwrap())
    }

    fn single_query(country: &str, city: &str) -> RoiQuery {
        RoiQuery {
            country: country.to_string(),
            city: city.to_string(),
            system_size_kw: 5.0,
            system_cost_usd: 6000.0,
            display_currency: "USD".to_string(),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn form_minimums_are_enforced() {
        assert!(validate_inputs(1.0, 1000.0).is_ok());
        assert!(validate_inputs(25.0, 30000.0).is_ok());
        assert!(validate_inputs(0.5, 6000.0).is_err());
        assert!(validate_inputs(5.0, 999.99).is_err());
        assert!(validate_inputs(f64::NAN, 6000.0).is_err());
        assert!(validate_inputs(5.0, f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn blank_selection_yields_empty_outcome() {
        let response = calculate(State(dataset()), Json(single_query("UAE", "")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mode"], "empty");
        assert_eq!(body["warning"], "Please select a city.");
    }

    #[tokio::test]
    async fn unknown_location_answers_not_found() {
        let response = calculate(State(dataset()), Json(single_query("UAE", "Sharjah")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Location not found");
    }

    #[tokio::test]
    async fn compare_skips_unknown_cities_in_order() {
        let query = CompareQuery {
            country: "UAE".to_string(),
            cities: vec![
                "Dubai".to_string(),
                "Atlantis".to_string(),
                "Abu Dhabi".to_string(),
            ],
            system_size_kw: 5.0,
            system_cost_usd: 6000.0,
            display_currency: "USD".to_string(),
        };
        let response = compare(State(dataset()), Json(query)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mode"], "batch");
        // The skip removes the row; nothing is substituted in its place
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["city"], "Dubai");
        assert_eq!(results[1]["city"], "Abu Dhabi");
        assert_eq!(
            body["warnings"],
            json!(["No reference data for Atlantis; skipped."])
        );
    }

    #[tokio::test]
    async fn empty_compare_selection_yields_empty_outcome() {
        let query = CompareQuery {
            country: "UAE".to_string(),
            cities: Vec::new(),
            system_size_kw: 5.0,
            system_cost_usd: 6000.0,
            display_currency: "USD".to_string(),
        };
        let response = compare(State(dataset()), Json(query)).await.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mode"], "empty");
        assert_eq!(
            body["warning"],
            "Please select at least one city in Compare Mode."
        );
    }
}
