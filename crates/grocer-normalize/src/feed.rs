//! Batch normalization of decoded retailer feed payloads.

use grocer_core::{CanonicalDeal, RetailerRules, RetailersFile};
use serde_json::Value;

use crate::error::NormalizeError;
use crate::normalize::normalize_deal;

/// Follows the retailer's `records_path` through a decoded feed payload and
/// returns its array of deal records.
///
/// A missing segment or a non-array target yields an empty slice.
#[must_use]
pub fn extract_records<'a>(payload: &'a Value, rules: &RetailerRules) -> &'a [Value] {
    let mut node = payload;
    for segment in &rules.records_path {
        let Some(next) = node.get(segment.as_str()) else {
            tracing::warn!(
                store = %rules.store_label,
                segment = %segment,
                "feed payload is missing records path segment"
            );
            return &[];
        };
        node = next;
    }

    if let Some(records) = node.as_array() {
        records.as_slice()
    } else {
        tracing::warn!(
            store = %rules.store_label,
            path = ?rules.records_path,
            "feed records path does not lead to an array"
        );
        &[]
    }
}

/// Normalizes every record, one output per input, in input order.
#[must_use]
pub fn normalize_all(records: &[Value], rules: &RetailerRules) -> Vec<CanonicalDeal> {
    let deals: Vec<CanonicalDeal> = records
        .iter()
        .map(|raw| normalize_deal(raw, rules))
        .collect();

    let priced = deals.iter().filter(|d| d.is_priced()).count();
    tracing::info!(
        store = %rules.store_label,
        total = deals.len(),
        priced,
        unpriced = deals.len() - priced,
        "normalized deal records"
    );

    deals
}

/// Extracts the deal records from a decoded feed payload and normalizes them.
#[must_use]
pub fn normalize_feed(payload: &Value, rules: &RetailerRules) -> Vec<CanonicalDeal> {
    normalize_all(extract_records(payload, rules), rules)
}

/// A normalizer bound to a rule table that has passed validation.
///
/// The free functions accept any table and simply ignore rules they cannot
/// apply; this wrapper is for callers that want a defective table rejected
/// up front.
#[derive(Debug, Clone, Copy)]
pub struct FeedNormalizer<'a> {
    rules: &'a RetailerRules,
}

impl<'a> FeedNormalizer<'a> {
    /// Validates `rules` and binds a normalizer to them.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidRules`] when the table fails validation.
    pub fn new(rules: &'a RetailerRules) -> Result<Self, NormalizeError> {
        rules
            .validate()
            .map_err(|source| NormalizeError::InvalidRules {
                retailer: rules.name.clone(),
                source,
            })?;
        Ok(Self { rules })
    }

    /// Looks up `retailer` in a loaded rules file and binds a normalizer to it.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::UnknownRetailer`] when no table has that name,
    /// or [`NormalizeError::InvalidRules`] when the table fails validation.
    pub fn for_retailer(file: &'a RetailersFile, retailer: &str) -> Result<Self, NormalizeError> {
        let rules = file
            .find(retailer)
            .ok_or_else(|| NormalizeError::UnknownRetailer {
                retailer: retailer.to_string(),
            })?;
        Self::new(rules)
    }

    #[must_use]
    pub fn rules(&self) -> &'a RetailerRules {
        self.rules
    }

    #[must_use]
    pub fn normalize(&self, raw: &Value) -> CanonicalDeal {
        normalize_deal(raw, self.rules)
    }

    #[must_use]
    pub fn normalize_all(&self, records: &[Value]) -> Vec<CanonicalDeal> {
        normalize_all(records, self.rules)
    }

    #[must_use]
    pub fn normalize_feed(&self, payload: &Value) -> Vec<CanonicalDeal> {
        normalize_feed(payload, self.rules)
    }
}
