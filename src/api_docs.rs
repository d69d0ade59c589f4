use utoipa::OpenApi;
use crate::controllers::roi_controller;
use crate::models::roi;

#[derive(OpenApi)]
#[openapi(
    paths(
        roi_controller::list_locations,
        roi_controller::list_countries,
        roi_controller::list_cities,
        roi_controller::map_markers,
        roi_controller::calculate,
        roi_controller::compare,
        roi_controller::report,
        roi_controller::ui_animation,
        roi_controller::system_info
    ),
    components(
        schemas(
            roi::LocationRecord,
            roi::RoiQuery,
            roi::CompareQuery,
            roi::RoiResult,
            roi::DisplayFigures,
            roi::CalculationOutcome,
            roi::MapMarker,
            roi::SystemInfo
        )
    ),
    tags(
        (name = "solar-roi-platform", description = "Cross-Border Solar Investment API")
    )
)]
pub struct ApiDoc;
