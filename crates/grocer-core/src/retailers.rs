//! Per-retailer rule tables.
//!
//! A [`RetailerRules`] tells the normalization engine where each semantic
//! field lives in a retailer's decoded feed record and which pricing-kind tags
//! select the structured promotion rules. Adding a retailer means adding a
//! table to `config/retailers.yaml`; the engine itself is shared.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Structured promotion rules selectable by a record's pricing-kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingKind {
    /// A listed total price covers two units.
    TwoFor,
    /// The listed price is per item and the second item is free.
    BuyOneGetOneFree,
    /// The listed price is per item and the second item is discounted.
    BuyOneGetOnePercentOff,
}

impl std::fmt::Display for PricingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingKind::TwoFor => write!(f, "two_for"),
            PricingKind::BuyOneGetOneFree => write!(f, "buy_one_get_one_free"),
            PricingKind::BuyOneGetOnePercentOff => write!(f, "buy_one_get_one_percent_off"),
        }
    }
}

/// Retailer-native tags mapped onto [`PricingKind`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingKinds {
    #[serde(default)]
    pub two_for: Vec<String>,
    #[serde(default)]
    pub buy_one_get_one_free: Vec<String>,
    #[serde(default)]
    pub buy_one_get_one_percent_off: Vec<String>,
}

impl PricingKinds {
    /// Classifies a raw pricing-kind tag. Matching ignores surrounding
    /// whitespace and ASCII case. Unknown tags yield `None`.
    #[must_use]
    pub fn classify(&self, tag: &str) -> Option<PricingKind> {
        let tag = tag.trim();
        let matches = |tags: &[String]| tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag));

        if matches(&self.two_for) {
            Some(PricingKind::TwoFor)
        } else if matches(&self.buy_one_get_one_free) {
            Some(PricingKind::BuyOneGetOneFree)
        } else if matches(&self.buy_one_get_one_percent_off) {
            Some(PricingKind::BuyOneGetOnePercentOff)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.two_for.is_empty()
            && self.buy_one_get_one_free.is_empty()
            && self.buy_one_get_one_percent_off.is_empty()
    }

    fn all_tags(&self) -> impl Iterator<Item = &String> {
        self.two_for
            .iter()
            .chain(&self.buy_one_get_one_free)
            .chain(&self.buy_one_get_one_percent_off)
    }
}

/// Raw record keys for each semantic deal field. `None` means the retailer's
/// feed does not carry that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Candidate keys for descriptive text, most specific first.
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub categories: Option<String>,
    /// Key holding the category text when category entries are objects.
    #[serde(default)]
    pub category_key: Option<String>,
    #[serde(default)]
    pub pricing_kind: Option<String>,
    #[serde(default)]
    pub listed_price: Option<String>,
    #[serde(default)]
    pub percent_off: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
    #[serde(default)]
    pub images: Option<String>,
    /// Key holding the URL when image entries are objects.
    #[serde(default = "default_image_url_key")]
    pub image_url_key: String,
    #[serde(default)]
    pub pre_price_text: Option<String>,
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub post_price_text: Option<String>,
}

fn default_image_url_key() -> String {
    "url".to_string()
}

impl FieldMap {
    /// A map with only the name key set.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            brand: None,
            details: Vec::new(),
            categories: None,
            category_key: None,
            pricing_kind: None,
            listed_price: None,
            percent_off: None,
            quantity: None,
            loyalty: None,
            images: None,
            image_url_key: default_image_url_key(),
            pre_price_text: None,
            price_text: None,
            post_price_text: None,
        }
    }

    /// Returns `true` when any fragmented price-text key is mapped.
    #[must_use]
    pub fn has_price_fragments(&self) -> bool {
        self.pre_price_text.is_some() || self.price_text.is_some() || self.post_price_text.is_some()
    }
}

/// The complete rule table for one retailer feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerRules {
    /// Lookup name, e.g. `"king-soopers"`.
    pub name: String,
    /// Label written to every canonical record's `store` field.
    pub store_label: String,
    /// Keys leading from a decoded feed payload to its array of deal records.
    /// Empty when the payload is itself the array.
    #[serde(default)]
    pub records_path: Vec<String>,
    pub fields: FieldMap,
    #[serde(default)]
    pub pricing_kinds: PricingKinds,
}

impl RetailerRules {
    /// Rule table for the King Soopers shoppable weekly-deals feed.
    #[must_use]
    pub fn king_soopers() -> Self {
        Self {
            name: "king-soopers".to_string(),
            store_label: "King Soopers".to_string(),
            records_path: vec![
                "data".to_string(),
                "shoppableWeeklyDeals".to_string(),
                "ads".to_string(),
            ],
            fields: FieldMap {
                details: vec!["underlineCopy".to_string(), "description".to_string()],
                categories: Some("departments".to_string()),
                category_key: Some("department".to_string()),
                pricing_kind: Some("pricingTemplate".to_string()),
                listed_price: Some("retailPrice".to_string()),
                percent_off: Some("percentOff".to_string()),
                quantity: Some("quantity".to_string()),
                loyalty: Some("loyaltyIndicator".to_string()),
                images: Some("images".to_string()),
                ..FieldMap::named("mainlineCopy")
            },
            pricing_kinds: PricingKinds {
                two_for: vec!["_KRGR_2FOR".to_string()],
                buy_one_get_one_free: vec!["_KRGR_BOGO".to_string()],
                buy_one_get_one_percent_off: vec!["_KRGR_BOGO %".to_string()],
            },
        }
    }

    /// Rule table for the Safeway flyer product feed.
    #[must_use]
    pub fn safeway() -> Self {
        Self {
            name: "safeway".to_string(),
            store_label: "Safeway".to_string(),
            records_path: Vec::new(),
            fields: FieldMap {
                brand: Some("brand".to_string()),
                details: vec!["description".to_string(), "sale_story".to_string()],
                categories: Some("categories".to_string()),
                images: Some("images".to_string()),
                pre_price_text: Some("pre_price_text".to_string()),
                price_text: Some("price_text".to_string()),
                post_price_text: Some("post_price_text".to_string()),
                ..FieldMap::named("name")
            },
            pricing_kinds: PricingKinds::default(),
        }
    }

    /// Checks the table for contract violations that would make the engine
    /// silently ignore configured rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "retailer name must be non-empty".to_string(),
            ));
        }

        let fail = |reason: &str| {
            Err(ConfigError::Validation(format!(
                "retailer '{}' {reason}",
                self.name
            )))
        };

        if self.store_label.trim().is_empty() {
            return fail("has an empty store_label");
        }
        if self.fields.name.trim().is_empty() {
            return fail("must map a name field");
        }
        if self.fields.listed_price.is_none() && self.fields.price_text.is_none() {
            return fail("must map listed_price or price_text");
        }
        if self.records_path.iter().any(|s| s.trim().is_empty()) {
            return fail("has an empty records_path segment");
        }

        if !self.pricing_kinds.is_empty() {
            if self.fields.pricing_kind.is_none() {
                return fail("defines pricing kind tags but maps no pricing_kind field");
            }
            if self.fields.listed_price.is_none() {
                return fail("defines pricing kind tags but maps no listed_price field");
            }
        }
        if !self.pricing_kinds.buy_one_get_one_percent_off.is_empty()
            && self.fields.percent_off.is_none()
        {
            return fail("defines percent-off tags but maps no percent_off field");
        }

        let mut seen_tags = HashSet::new();
        for tag in self.pricing_kinds.all_tags() {
            let normalized = tag.trim().to_ascii_lowercase();
            if normalized.is_empty() {
                return fail("has an empty pricing kind tag");
            }
            if !seen_tags.insert(normalized) {
                return Err(ConfigError::Validation(format!(
                    "retailer '{}' maps pricing kind tag '{tag}' more than once",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailersFile {
    pub retailers: Vec<RetailerRules>,
}

impl RetailersFile {
    /// Looks up a retailer's rule table by name, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&RetailerRules> {
        self.retailers
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Load and validate retailer rule tables from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_retailers(path: &Path) -> Result<RetailersFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RetailersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let retailers_file: RetailersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::RetailersFileParse)?;

    validate_retailers(&retailers_file)?;

    Ok(retailers_file)
}

fn validate_retailers(retailers_file: &RetailersFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for rules in &retailers_file.retailers {
        rules.validate()?;

        if !seen_names.insert(rules.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate retailer name: '{}'",
                rules.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "retailers_test.rs"]
mod tests;
