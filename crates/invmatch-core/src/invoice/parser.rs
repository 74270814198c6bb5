//! Rule-driven invoice parser.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::document::RawDocument;
use crate::models::invoice::{FieldKind, InvoiceRecord};
use crate::models::result::DocumentWarning;
use crate::normalize::{detect_currency, normalize_document};

use super::rules::{
    description_rules, invoice_date_rules, invoice_number_rules, net_amount_rules,
    po_number_rules, reconcile_amounts, store_rules, total_amount_rules, vat_amount_rules,
    CustomerMarker, FieldExtractor, RuleCascade, RuleContext, SourcedAmount,
};
use super::supplier::{legal_name, Supplier, SupplierRegistry};
use super::Result;

/// Suppliers whose invoices may print nothing but a gross figure.
const GROSS_ONLY_SUPPLIERS: &[&str] = &["AMAZON"];

/// Optional fields whose absence is reported as a warning.
const REPORTED_OPTIONAL_FIELDS: &[FieldKind] = &[
    FieldKind::InvoiceNumber,
    FieldKind::PoNumber,
    FieldKind::StoreName,
    FieldKind::InvoiceDate,
];

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: InvoiceRecord,
    /// Optional fields that could not be extracted.
    pub warnings: Vec<DocumentWarning>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Extract an invoice record from a document's text.
    fn parse(&self, document: &RawDocument) -> Result<ExtractionResult>;
}

/// Parser that runs the per-field rule cascades.
pub struct RuleInvoiceParser {
    registry: SupplierRegistry,
    config: ExtractionConfig,
    customer: CustomerMarker,
}

impl RuleInvoiceParser {
    /// Create a parser with the built-in registry and default settings.
    pub fn new() -> Self {
        let config = ExtractionConfig::default();
        Self {
            registry: SupplierRegistry::builtin(),
            customer: CustomerMarker::new(config.customer_marker.as_str()),
            config,
        }
    }

    pub fn with_registry(mut self, registry: SupplierRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.customer = CustomerMarker::new(config.customer_marker.as_str());
        self.config = config;
        self
    }

    pub fn registry(&self) -> &SupplierRegistry {
        &self.registry
    }

    /// Registry first; an unregistered supplier falls back to the legal
    /// name printed on the document.
    fn identify_supplier(&self, text: &str, filename: &str) -> Result<(String, Option<String>, &'static str)> {
        match self.registry.identify(text, filename) {
            Supplier::Known { name, code } => Ok((name, Some(code), "supplier.registry")),
            Supplier::Unknown => legal_name(text, &self.config.customer_marker)
                .map(|name| (name, None, "supplier.legal_name"))
                .ok_or(ExtractionError::MandatoryFieldMissing(FieldKind::Supplier)),
        }
    }

    fn amount(
        cascade: &RuleCascade<rust_decimal::Decimal>,
        text: &str,
        ctx: &RuleContext<'_>,
    ) -> Option<SourcedAmount> {
        cascade
            .extract(text, ctx)
            .map(|m| SourcedAmount::new(m.value, m.rule_id))
    }
}

impl Default for RuleInvoiceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one cascade and record the winning rule.
fn run<T>(
    cascade: &RuleCascade<T>,
    text: &str,
    ctx: &RuleContext<'_>,
    provenance: &mut BTreeMap<FieldKind, String>,
) -> Option<T> {
    let found = cascade.extract(text, ctx)?;
    debug!("{} matched by {}", cascade.field(), found.rule_id);
    provenance.insert(cascade.field(), found.rule_id.to_string());
    Some(found.value)
}

impl InvoiceParser for RuleInvoiceParser {
    fn parse(&self, document: &RawDocument) -> Result<ExtractionResult> {
        let start = Instant::now();
        let text = normalize_document(&document.text());

        info!(
            "Parsing {} ({} characters of text)",
            document.source_filename,
            text.len()
        );

        let (supplier_name, supplier_code, supplier_rule) =
            self.identify_supplier(&text, &document.source_filename)?;

        let mut provenance = BTreeMap::new();
        provenance.insert(FieldKind::Supplier, supplier_rule.to_string());

        let ctx = RuleContext::new(supplier_code.as_deref(), &document.source_filename)
            .with_billing_addresses(&self.config.billing_addresses)
            .with_customer_marker(&self.customer);

        let invoice_number = run(invoice_number_rules(), &text, &ctx, &mut provenance);
        let po_number = run(po_number_rules(), &text, &ctx, &mut provenance);
        let store_name = run(store_rules(), &text, &ctx, &mut provenance);
        let invoice_date = run(invoice_date_rules(), &text, &ctx, &mut provenance);
        let description = run(description_rules(), &text, &ctx, &mut provenance);

        let gross_only_rate = supplier_code
            .as_deref()
            .filter(|code| GROSS_ONLY_SUPPLIERS.contains(code))
            .map(|_| self.config.vat_rate);

        let amounts = reconcile_amounts(
            Self::amount(net_amount_rules(), &text, &ctx),
            Self::amount(vat_amount_rules(), &text, &ctx),
            Self::amount(total_amount_rules(), &text, &ctx),
            gross_only_rate,
        );

        let net = amounts
            .net
            .ok_or(ExtractionError::MandatoryFieldMissing(FieldKind::NetAmount))?;
        provenance.insert(FieldKind::NetAmount, net.rule_id);
        if let Some(vat) = &amounts.vat {
            provenance.insert(FieldKind::VatAmount, vat.rule_id.clone());
        }
        if let Some(total) = &amounts.total {
            provenance.insert(FieldKind::TotalAmount, total.rule_id.clone());
        }

        let currency = detect_currency(&text)
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_currency.clone());

        let invoice = InvoiceRecord {
            document_id: document.id.clone(),
            supplier_name,
            supplier_code,
            invoice_number,
            po_number,
            net_amount: net.value,
            vat_amount: amounts.vat.map(|a| a.value),
            total_amount: amounts.total.map(|a| a.value),
            currency,
            store_name,
            invoice_date,
            description,
            provenance,
        };

        let warnings: Vec<DocumentWarning> = REPORTED_OPTIONAL_FIELDS
            .iter()
            .filter(|field| invoice.rule_for(**field).is_none())
            .map(|field| DocumentWarning::MissingField { field: *field })
            .collect();
        for w in &warnings {
            warn!("{}: {}", document.source_filename, w);
        }

        info!(
            "Extracted {} net {} {}",
            invoice.display_label(),
            invoice.net_amount,
            invoice.currency
        );

        Ok(ExtractionResult {
            invoice,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
