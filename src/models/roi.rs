use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

// ─── Reference data ──────────────────────────────────────────────────────────

/// One row of the reference dataset, validated at load time.
/// Read-only for the process lifetime; each (country, city) pair is unique.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationRecord {
    pub country: String,
    pub city: String,
    /// Daily global horizontal irradiance (kWh/m²/day)
    pub ghi_daily: f64,
    /// Grid electricity tariff (USD/kWh)
    pub tariff_usd_per_kwh: f64,
    #[schema(value_type = String, example = "CAPEX_Subsidy")]
    pub incentive_type: IncentiveType,
    /// Upfront incentive value (USD). Only a CAPEX subsidy reduces net cost.
    pub incentive_value_usd: f64,
    pub policy_summary: String,
    pub currency_code: String,
    pub currency_symbol: String,
    /// Static exchange rate: 1 USD expressed in the local currency
    pub usd_to_local_rate: f64,
    /// Map placement only — never enters the calculation
    pub latitude: f64,
    pub longitude: f64,
}

/// Incentive classification. `CapexSubsidy` is the only variant that changes
/// the arithmetic; every other dataset label is carried verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncentiveType {
    CapexSubsidy,
    Other(String),
}

impl IncentiveType {
    pub const CAPEX_LABEL: &'static str = "CAPEX_Subsidy";

    pub fn from_label(label: &str) -> Self {
        if label == Self::CAPEX_LABEL {
            IncentiveType::CapexSubsidy
        } else {
            IncentiveType::Other(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            IncentiveType::CapexSubsidy => Self::CAPEX_LABEL,
            IncentiveType::Other(label) => label,
        }
    }

    pub fn is_capex_subsidy(&self) -> bool {
        matches!(self, IncentiveType::CapexSubsidy)
    }
}

impl Serialize for IncentiveType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for IncentiveType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(IncentiveType::from_label(&label))
    }
}

// ─── Calculation request ─────────────────────────────────────────────────────

/// Currency the monetary figures are converted into for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCurrency {
    Usd,
    Local,
}

impl DisplayCurrency {
    /// Exactly "USD" selects US dollars; any other code means the location's
    /// local currency (the form only ever offers those two choices).
    pub fn from_code(code: &str) -> Self {
        if code == "USD" {
            DisplayCurrency::Usd
        } else {
            DisplayCurrency::Local
        }
    }
}

/// Parameters of one ROI evaluation, shared by every location in a batch.
#[derive(Debug, Clone, Copy)]
pub struct RoiRequest {
    pub system_size_kw: f64,
    pub system_cost_usd: f64,
    pub display_currency: DisplayCurrency,
}

// ─── Calculation result ──────────────────────────────────────────────────────

/// Monetary figures converted into the requested display currency.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisplayFigures {
    pub currency_code: String,
    pub currency_symbol: String,
    pub system_cost: f64,
    pub net_cost: f64,
    pub annual_revenue: f64,
    pub incentive_value: f64,
    pub tariff_per_kwh: f64,
}

/// Outcome of one (location, request) evaluation. Immutable once computed;
/// USD-basis figures first, display-converted figures nested, inputs echoed
/// back so the report and the details panel need nothing else.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoiResult {
    pub country: String,
    pub city: String,

    /// Estimated yearly production (kWh)
    pub annual_energy_kwh: f64,
    /// Yearly revenue at the local tariff, before display conversion (USD)
    pub annual_revenue_usd: f64,
    /// System cost after any CAPEX subsidy (USD)
    pub net_cost_usd: f64,
    /// Simple payback: net cost over floored annual revenue
    pub payback_years: f64,
    /// True when the 0.01 USD revenue floor engaged — the payback figure is
    /// then an artifact of degenerate input, not a forecast.
    pub degenerate: bool,

    // Echoed inputs & assumptions
    pub system_size_kw: f64,
    pub system_cost_usd: f64,
    pub performance_ratio: f64,
    pub ghi_daily: f64,
    #[schema(value_type = String, example = "CAPEX_Subsidy")]
    pub incentive_type: IncentiveType,
    pub incentive_value_usd: f64,
    pub policy_summary: String,

    pub display: DisplayFigures,
    /// `Solar_Report_{country}_{city}.pdf` — the download name the report
    /// endpoint will answer with (single mode only)
    pub report_file_name: String,
    pub computed_at: DateTime<Utc>,
}

/// What one "Calculate" action produced. The caller holds this for a single
/// display cycle; the server keeps no result state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalculationOutcome {
    /// Single-location mode
    Single { result: RoiResult },
    /// Compare mode: one result per selected location, input order preserved,
    /// no aggregation. Skipped locations are reported in `warnings`.
    Batch {
        results: Vec<RoiResult>,
        warnings: Vec<String>,
    },
    /// Nothing was selected — a warning for the user, not an error.
    Empty { warning: String },
}

// ─── REST API request bodies ─────────────────────────────────────────────────

fn default_display_currency() -> String {
    "USD".to_string()
}

/// Body of `/api/roi/calculate` and `/api/roi/report` (single mode).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RoiQuery {
    pub country: String,
    pub city: String,
    /// Planned panel capacity (kW), form minimum 1
    pub system_size_kw: f64,
    /// Total system cost in USD, form minimum 1000
    pub system_cost_usd: f64,
    /// "USD" or the location's local currency code
    #[serde(default = "default_display_currency")]
    pub display_currency: String,
}

/// Body of `/api/roi/compare` (compare mode).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompareQuery {
    pub country: String,
    /// Cities to evaluate, in display order
    pub cities: Vec<String>,
    pub system_size_kw: f64,
    pub system_cost_usd: f64,
    #[serde(default = "default_display_currency")]
    pub display_currency: String,
}

// ─── REST API response types ─────────────────────────────────────────────────

/// One marker of the all-locations map, with the tooltip/popup fields the
/// frontend renders. Independent of any user selection.
#[derive(Debug, Serialize, ToSchema)]
pub struct MapMarker {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub ghi_daily: f64,
    pub tariff_usd_per_kwh: f64,
    pub policy_summary: String,
    pub currency_code: String,
    pub usd_to_local_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemInfo {
    pub version: String,
    pub location_count: usize,
    pub country_count: usize,
    pub performance_ratio: f64,
    /// Exchange rates are static dataset values, not a live feed
    pub exchange_rate_basis: String,
}
