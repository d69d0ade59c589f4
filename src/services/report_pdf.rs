/// ============================================================
///  PDF Report Formatter
///
///  Renders one finished ROI result into an A4 summary:
///   1. Title               – "Solar Investment Summary: {city}, {country}"
///   2. Key Metrics         – payback, net cost, annual revenue
///   3. Input Assumptions   – location, size, cost, annual energy
///   4. Policy & Incentives – wrapped policy text
///
///  Formatting only: every figure arrives pre-computed on the result.
///  Monetary lines show the display currency; energy stays in kWh.
/// ============================================================

use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

use crate::models::roi::RoiResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render PDF report: {0}")]
    Pdf(#[from] printpdf::Error),
}

// ─── Page layout (A4 portrait, mm) ───────────────────────────
const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: Mm = Mm(20.0);
const MARGIN_BOTTOM: Mm = Mm(20.0);
/// First text baseline on every page
const CONTENT_TOP: Mm = Mm(272.0);

// Characters per body line at 12 pt across the printable width
const WRAP_COLUMNS: usize = 72;

/// Download name for a location's report. Spaces in country or city names
/// are kept as-is; the HTTP layer quotes the value.
pub fn file_name(country: &str, city: &str) -> String {
    format!("Solar_Report_{country}_{city}.pdf")
}

/// Render the report into PDF bytes, ready to stream as a download.
pub fn render(result: &RoiResult) -> Result<Vec<u8>, ReportError> {
    let title = format!(
        "Solar Investment Summary: {}, {}",
        result.city, result.country
    );
    let (doc, page, layer) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let mut layer = doc.get_page(page).get_layer(layer);

    // Builtin fonts are WinAnsi-encoded: print currency codes, never
    // symbols (Rs encodes, a rupee sign does not).
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let code = &result.display.currency_code;
    let mut y = CONTENT_TOP;

    // ── Title ──────────────────────────────────────────────────
    layer.use_text(&title, 16.0, MARGIN_LEFT, y, &bold);
    y = y - Mm(18.0);

    // ── Key Metrics ────────────────────────────────────────────
    layer.use_text("Key Metrics", 12.0, MARGIN_LEFT, y, &bold);
    y = y - Mm(10.0);
    for line in [
        format!("  - Payback Period: {:.2} Years", result.payback_years),
        format!(
            "  - Net System Cost: {} {code}",
            group_thousands(result.display.net_cost, 2)
        ),
        format!(
            "  - Est. Annual Revenue: {} {code}",
            group_thousands(result.display.annual_revenue, 2)
        ),
    ] {
        layer.use_text(line, 12.0, MARGIN_LEFT, y, &regular);
        y = y - Mm(8.0);
    }
    y = y - Mm(5.0);

    // ── Input Assumptions ──────────────────────────────────────
    layer.use_text("Input Assumptions", 12.0, MARGIN_LEFT, y, &bold);
    y = y - Mm(10.0);
    for line in [
        format!("  - Location: {}, {}", result.city, result.country),
        format!("  - System Size: {} kW", result.system_size_kw),
        format!(
            "  - Initial Cost (Est.): {} {code}",
            group_thousands(result.display.system_cost, 2)
        ),
        format!(
            "  - Est. Annual Energy: {} kWh",
            group_thousands(result.annual_energy_kwh, 0)
        ),
    ] {
        layer.use_text(line, 12.0, MARGIN_LEFT, y, &regular);
        y = y - Mm(8.0);
    }
    y = y - Mm(5.0);

    // ── Policy & Incentives ────────────────────────────────────
    layer.use_text("Policy & Incentives", 12.0, MARGIN_LEFT, y, &bold);
    y = y - Mm(10.0);
    for line in wrap_text(&format!("- {}", result.policy_summary), WRAP_COLUMNS) {
        // The only unbounded section: long policy text continues on a
        // fresh page instead of running past the bottom margin.
        if y.0 < MARGIN_BOTTOM.0 {
            let (next_page, next_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = CONTENT_TOP;
        }
        layer.use_text(line, 12.0, MARGIN_LEFT, y, &regular);
        y = y - Mm(8.0);
    }

    Ok(doc.save_to_bytes()?)
}

/// `1234567.891` → `"1,234,567.89"` (two decimals), `7528.125` → `"7,528"`
/// (zero decimals). Keeps the sign in front of the grouping.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Greedy word wrap. A single word longer than the limit stays whole on
/// its own line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
