/// ============================================================
///  Solar Investment ROI Engine
///
///  Calculation pipeline (all USD until display conversion):
///   1. Annual production – size × daily GHI × 365 × performance ratio
///   2. Annual revenue    – production × local grid tariff
///   3. Net cost          – system cost minus CAPEX subsidy (if any)
///   4. Simple payback    – net cost / annual revenue, revenue floored
///                          at 0.01 USD so the division is always defined
///   5. Display figures   – monetary values converted to the requested
///                          currency at the static dataset rate
/// ============================================================

use chrono::{DateTime, Utc};

use crate::models::roi::{DisplayFigures, LocationRecord, RoiRequest, RoiResult};
use crate::services::{currency, report_pdf};

// ─── Model constants ─────────────────────────────────────────
/// Fixed system performance ratio (inverter, wiring, soiling, temperature).
pub const PERFORMANCE_RATIO: f64 = 0.75;
/// Floor applied to annual revenue before the payback division.
pub const REVENUE_FLOOR_USD: f64 = 0.01;

const DAYS_PER_YEAR: f64 = 365.0;

/// Evaluate one location against one set of investment parameters.
///
/// Pure apart from the caller-supplied timestamp: same record + request
/// always produce the same figures. The result is self-contained — it
/// echoes every input and assumption the report or details panel shows.
///
/// * `record`      – reference dataset row for the chosen city
/// * `request`     – system size (kW), cost (USD), display currency
/// * `computed_at` – evaluation timestamp (from Utc::now())
pub fn evaluate(
    record: &LocationRecord,
    request: &RoiRequest,
    computed_at: DateTime<Utc>,
) -> RoiResult {
    evaluate_with_ratio(record, request, PERFORMANCE_RATIO, computed_at)
}

/// Same pipeline with the derating constant as a parameter.
pub fn evaluate_with_ratio(
    record: &LocationRecord,
    request: &RoiRequest,
    performance_ratio: f64,
    computed_at: DateTime<Utc>,
) -> RoiResult {
    // ── 1. Annual production (kWh) ─────────────────────────────
    let annual_energy_kwh =
        request.system_size_kw * record.ghi_daily * DAYS_PER_YEAR * performance_ratio;

    // ── 2. Annual revenue at the local tariff (USD) ────────────
    let annual_revenue_usd = annual_energy_kwh * record.tariff_usd_per_kwh;

    // ── 3. Net cost after incentives (USD) ─────────────────────
    // Only an upfront CAPEX subsidy reduces the investment; other
    // incentive kinds are informational and leave the cost untouched.
    let net_cost_usd = if record.incentive_type.is_capex_subsidy() {
        request.system_cost_usd - record.incentive_value_usd
    } else {
        request.system_cost_usd
    };

    // ── 4. Simple payback (years) ──────────────────────────────
    let degenerate = annual_revenue_usd < REVENUE_FLOOR_USD;
    let payback_years = net_cost_usd / annual_revenue_usd.max(REVENUE_FLOOR_USD);

    // ── 5. Display currency conversion ─────────────────────────
    let rate = currency::display_rate(record, request.display_currency);
    let display = DisplayFigures {
        system_cost: currency::to_display(request.system_cost_usd, &rate),
        net_cost: currency::to_display(net_cost_usd, &rate),
        annual_revenue: currency::to_display(annual_revenue_usd, &rate),
        incentive_value: currency::to_display(record.incentive_value_usd, &rate),
        tariff_per_kwh: currency::to_display(record.tariff_usd_per_kwh, &rate),
        currency_code: rate.code,
        currency_symbol: rate.symbol,
    };

    RoiResult {
        country: record.country.clone(),
        city: record.city.clone(),
        annual_energy_kwh,
        annual_revenue_usd,
        net_cost_usd,
        payback_years,
        degenerate,
        system_size_kw: request.system_size_kw,
        system_cost_usd: request.system_cost_usd,
        performance_ratio,
        ghi_daily: record.ghi_daily,
        incentive_type: record.incentive_type.clone(),
        incentive_value_usd: record.incentive_value_usd,
        policy_summary: record.policy_summary.clone(),
        display,
        report_file_name: report_pdf::file_name(&record.country, &record.city),
        computed_at,
    }
}

/// Compare mode: the same request over an ordered list of locations.
/// One result per record, input order preserved, no aggregation.
pub fn evaluate_many(
    records: &[&LocationRecord],
    request: &RoiRequest,
    computed_at: DateTime<Utc>,
) -> Vec<RoiResult> {
    records
        .iter()
        .map(|record| evaluate(record, request, computed_at))
        .collect()
}
