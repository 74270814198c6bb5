//! Configuration structures for the matching pipeline.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for the invmatch pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvmatchConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Ledger loading configuration.
    pub ledger: LedgerConfig,

    /// Matcher thresholds and weights.
    pub matching: MatchingConfig,

    /// Post-match validation limits.
    pub validation: ValidationConfig,
}

/// A (city, postcode) pair as found in address blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPair {
    pub city: String,
    pub postcode: String,
}

impl AddressPair {
    pub fn new(city: impl Into<String>, postcode: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            postcode: postcode.into(),
        }
    }

    /// Case- and spacing-insensitive equality.
    pub fn same_as(&self, other: &AddressPair) -> bool {
        self.city.eq_ignore_ascii_case(&other.city)
            && compact_postcode(&self.postcode) == compact_postcode(&other.postcode)
    }
}

fn compact_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// The customer's own billing addresses, never a store location.
    pub billing_addresses: Vec<AddressPair>,

    /// Customer name as printed on supplier invoices.
    pub customer_marker: String,

    /// Currency used when the document shows no symbol.
    pub default_currency: String,

    /// VAT rate assumed when only a gross figure is printed.
    pub vat_rate: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            billing_addresses: vec![AddressPair::new("Dorking", "RH4 1XA")],
            customer_marker: "Menkind".to_string(),
            default_currency: "GBP".to_string(),
            vat_rate: Decimal::new(20, 2),
        }
    }
}

/// Ledger loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Column names that identify the header row.
    pub header_tokens: Vec<String>,

    /// How many leading rows are searched for the header.
    pub header_scan_rows: usize,

    /// Minimum number of recognized column names in the header row.
    pub min_header_tokens: usize,

    /// Supplier code to sheet id.
    pub sheet_routes: BTreeMap<String, String>,

    /// Sheet for unrouted and unknown suppliers.
    pub default_sheet: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let header_tokens = [
            "PO",
            "STORE",
            "ORIGINATOR",
            "DATE",
            "JOB DESCRIPTION",
            "QUOTE OVER",
            "AUTHORISED",
            "DATE COMPLETED",
            "INVOICE NO",
            "INVOICE NUMBER",
            "INVOICE SIGNED",
            "INVOICE AMOUNT",
            "NOMINAL CODE",
            "BRAND",
            "TICKET NO",
            "SUPPLIER",
            "PO VALUE",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let sheet_routes = [
            ("AAW", "AAW NATIONAL (PANDA)"),
            ("CJL", "CJL"),
            ("APS", "APS"),
            ("AMAZON", "ORDERS"),
            ("LAMPSHOP", "ORDERS"),
            ("AURA", "AURA AC"),
            ("STORE_MAINTENANCE", "STORE MAINTENANCE"),
        ]
        .into_iter()
        .map(|(code, sheet)| (code.to_string(), sheet.to_string()))
        .collect();

        Self {
            header_tokens,
            header_scan_rows: 10,
            min_header_tokens: 3,
            sheet_routes,
            default_sheet: "OTHER".to_string(),
        }
    }
}

/// Matcher thresholds and weights. Scores are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Store similarity at or above which two store names agree.
    pub store_threshold: f64,

    /// Aggregate score the top fuzzy candidate must reach.
    pub acceptance_threshold: f64,

    /// Lead the top fuzzy candidate must hold over the runner-up.
    pub min_margin: f64,

    pub store_weight: f64,
    pub amount_weight: f64,

    /// Relative amount difference at which the amount score reaches zero.
    pub amount_tolerance: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            store_threshold: 70.0,
            acceptance_threshold: 70.0,
            min_margin: 15.0,
            store_weight: 0.7,
            amount_weight: 0.3,
            amount_tolerance: 0.10,
        }
    }
}

/// Post-match validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Net amount above which quote and authorisation are required.
    pub quote_threshold: Decimal,

    /// Net amount above which a warning is raised.
    pub high_amount: Decimal,

    /// Store similarity below which the store check is an error.
    pub store_error_below: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            quote_threshold: Decimal::new(200, 0),
            high_amount: Decimal::new(10_000, 0),
            store_error_below: 50.0,
        }
    }
}

impl InvmatchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Sheet id for a supplier code, `None` meaning an unregistered supplier.
    pub fn sheet_for(&self, supplier_code: Option<&str>) -> &str {
        supplier_code
            .and_then(|code| self.ledger.sheet_routes.get(code))
            .map(String::as_str)
            .unwrap_or(&self.ledger.default_sheet)
    }
}
