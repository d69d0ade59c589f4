use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::roi::{IncentiveType, LocationRecord};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read reference data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse reference data: {0}")]
    Csv(#[from] csv::Error),
    #[error("reference data row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
    #[error("duplicate location in reference data: {city}, {country}")]
    DuplicateLocation { country: String, city: String },
    #[error("reference data contains no locations")]
    Empty,
}

/// Raw CSV row, field names matching the file header exactly. A missing
/// column or an unparseable value surfaces as a csv deserialize error.
#[derive(Debug, Deserialize)]
struct RawLocationRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "GHI_Daily")]
    ghi_daily: f64,
    #[serde(rename = "Tariff_USD_kWh")]
    tariff_usd_kwh: f64,
    #[serde(rename = "Incentive_Type")]
    incentive_type: String,
    #[serde(rename = "Incentive_Value_USD")]
    incentive_value_usd: f64,
    #[serde(rename = "Policy_Summary")]
    policy_summary: String,
    #[serde(rename = "Local_Currency_Code")]
    local_currency_code: String,
    #[serde(rename = "Local_Currency_Symbol")]
    local_currency_symbol: String,
    #[serde(rename = "USD_to_Local_Rate")]
    usd_to_local_rate: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
}

fn positive(value: f64, field: &str) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{field} must be a positive number, got {value}"))
    }
}

fn non_negative(value: f64, field: &str) -> Result<f64, String> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{field} must be zero or positive, got {value}"))
    }
}

fn non_empty(value: String, field: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(value)
    }
}

impl RawLocationRow {
    fn into_record(self) -> Result<LocationRecord, String> {
        Ok(LocationRecord {
            country: non_empty(self.country, "Country")?,
            city: non_empty(self.city, "City")?,
            ghi_daily: positive(self.ghi_daily, "GHI_Daily")?,
            tariff_usd_per_kwh: positive(self.tariff_usd_kwh, "Tariff_USD_kWh")?,
            incentive_type: IncentiveType::from_label(&self.incentive_type),
            incentive_value_usd: non_negative(self.incentive_value_usd, "Incentive_Value_USD")?,
            policy_summary: self.policy_summary,
            currency_code: non_empty(self.local_currency_code, "Local_Currency_Code")?,
            currency_symbol: non_empty(self.local_currency_symbol, "Local_Currency_Symbol")?,
            usd_to_local_rate: positive(self.usd_to_local_rate, "USD_to_Local_Rate")?,
            // Coordinates feed the map only; no range check by design.
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

/// The static reference table: loaded once at startup, immutable afterwards.
/// Small enough that lookups are a linear scan over the file-ordered rows.
#[derive(Debug)]
pub struct ReferenceDataset {
    records: Vec<LocationRecord>,
}

impl ReferenceDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records: Vec<LocationRecord> = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for (i, raw) in csv_reader.deserialize::<RawLocationRow>().enumerate() {
            let raw = raw?;
            let record = raw.into_record().map_err(|reason| DatasetError::InvalidRow {
                // +2: 1-based line numbers, header on line 1
                row: i + 2,
                reason,
            })?;
            if !seen.insert((record.country.clone(), record.city.clone())) {
                return Err(DatasetError::DuplicateLocation {
                    country: record.country,
                    city: record.city,
                });
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All rows in file order — the Data Overview table and the map.
    pub fn all(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Countries in first-seen order, deduplicated.
    pub fn countries(&self) -> Vec<&str> {
        let mut countries: Vec<&str> = Vec::new();
        for record in &self.records {
            if !countries.contains(&record.country.as_str()) {
                countries.push(record.country.as_str());
            }
        }
        countries
    }

    pub fn country_count(&self) -> usize {
        self.countries().len()
    }

    /// Cities of one country in file order. Empty exactly when the country
    /// is unknown (every row carries a city).
    pub fn cities_in(&self, country: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.country == country)
            .map(|r| r.city.as_str())
            .collect()
    }

    /// Exact-match lookup on the unique (country, city) key.
    pub fn get(&self, country: &str, city: &str) -> Option<&LocationRecord> {
        self.records
            .iter()
            .find(|r| r.country == country && r.city == city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Country,City,GHI_Daily,Tariff_USD_kWh,Incentive_Type,Incentive_Value_USD,Policy_Summary,Local_Currency_Code,Local_Currency_Symbol,USD_to_Local_Rate,Latitude,Longitude";

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             UAE,Dubai,6.0,0.08,CAPEX_Subsidy,1200,\"Upfront rebate, capped\",AED,Dh,3.67,25.2,55.27\n\
             UAE,Abu Dhabi,5.9,0.07,Net_Metering,0,Net metering credits,AED,Dh,3.67,24.45,54.38\n\
             India,Mumbai,5.1,0.11,CAPEX_Subsidy,900,Rooftop subsidy phase II,INR,Rs,83.2,19.08,72.88\n"
        )
    }

    #[test]
    fn loads_valid_csv_in_file_order() {
        let ds = ReferenceDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.countries(), vec!["UAE", "India"]);
        assert_eq!(ds.country_count(), 2);
        assert_eq!(ds.cities_in("UAE"), vec!["Dubai", "Abu Dhabi"]);
        assert_eq!(ds.cities_in("India"), vec!["Mumbai"]);
        assert!(ds.cities_in("France").is_empty());

        let dubai = ds.get("UAE", "Dubai").unwrap();
        assert_eq!(dubai.ghi_daily, 6.0);
        assert!(dubai.incentive_type.is_capex_subsidy());
        assert_eq!(dubai.policy_summary, "Upfront rebate, capped");

        let abu_dhabi = ds.get("UAE", "Abu Dhabi").unwrap();
        assert_eq!(abu_dhabi.incentive_type.label(), "Net_Metering");
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_csv().as_bytes()).unwrap();

        let ds = ReferenceDataset::load(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert!(ds.get("India", "Mumbai").is_some());
    }

    #[test]
    fn unknown_key_is_none() {
        let ds = ReferenceDataset::from_reader(sample_csv().as_bytes()).unwrap();
        assert!(ds.get("UAE", "Sharjah").is_none());
        // Exact match only: city belongs to the other country
        assert!(ds.get("India", "Dubai").is_none());
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "Country,City,GHI_Daily\nUAE,Dubai,6.0\n";
        let err = ReferenceDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn unparseable_value_is_fatal() {
        let csv = format!(
            "{HEADER}\nUAE,Dubai,sunny,0.08,None,0,none,AED,Dh,3.67,25.2,55.27\n"
        );
        let err = ReferenceDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn out_of_domain_value_is_fatal() {
        let csv = format!(
            "{HEADER}\nUAE,Dubai,-6.0,0.08,None,0,none,AED,Dh,3.67,25.2,55.27\n"
        );
        let err = ReferenceDataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidRow { row, reason } => {
                assert_eq!(row, 2);
                assert!(reason.contains("GHI_Daily"));
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn negative_incentive_is_fatal() {
        let csv = format!(
            "{HEADER}\nUAE,Dubai,6.0,0.08,CAPEX_Subsidy,-100,none,AED,Dh,3.67,25.2,55.27\n"
        );
        assert!(matches!(
            ReferenceDataset::from_reader(csv.as_bytes()),
            Err(DatasetError::InvalidRow { .. })
        ));
    }

    #[test]
    fn duplicate_key_is_fatal() {
        let csv = format!(
            "{HEADER}\n\
             UAE,Dubai,6.0,0.08,None,0,none,AED,Dh,3.67,25.2,55.27\n\
             UAE,Dubai,5.8,0.09,None,0,none,AED,Dh,3.67,25.2,55.27\n"
        );
        match ReferenceDataset::from_reader(csv.as_bytes()).unwrap_err() {
            DatasetError::DuplicateLocation { country, city } => {
                assert_eq!(country, "UAE");
                assert_eq!(city, "Dubai");
            }
            other => panic!("expected DuplicateLocation, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_fatal() {
        let err = ReferenceDataset::from_reader(format!("{HEADER}\n").as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }
}
