/// Display-currency conversion against the static dataset rates.
///
/// All arithmetic happens in USD; conversion is a single multiply applied
/// to finished figures just before display. Rates never come from a live
/// feed — each location row carries its own `USD_to_Local_Rate`.

use crate::models::roi::{DisplayCurrency, LocationRecord};

/// Resolved conversion for one location + one currency choice.
#[derive(Debug, Clone)]
pub struct DisplayRate {
    /// Multiplier applied to USD amounts (1.0 for USD itself)
    pub rate: f64,
    pub code: String,
    pub symbol: String,
}

pub fn display_rate(record: &LocationRecord, currency: DisplayCurrency) -> DisplayRate {
    match currency {
        DisplayCurrency::Usd => DisplayRate {
            rate: 1.0,
            code: "USD".to_string(),
            symbol: "$".to_string(),
        },
        DisplayCurrency::Local => DisplayRate {
            rate: record.usd_to_local_rate,
            code: record.currency_code.clone(),
            symbol: record.currency_symbol.clone(),
        },
    }
}

#[inline]
pub fn to_display(amount_usd: f64, rate: &DisplayRate) -> f64 {
    amount_usd * rate.rate
}
