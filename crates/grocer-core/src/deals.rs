use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Display text used when no price can be derived from a deal record.
pub const PRICE_FALLBACK: &str = "See store for details";

/// A promotional deal normalized into a retailer-agnostic shape for display
/// and cross-store comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDeal {
    /// Fixed label of the source retailer, e.g. `"King Soopers"`.
    pub store: String,
    /// `"{brand} {name}"` when the feed carries a brand, otherwise the bare title.
    pub name: String,
    pub details: Option<String>,
    /// Category names joined with `", "`.
    pub dept: Option<String>,
    /// Human-readable price text, e.g. `"2 for $5.00"`. Never empty; falls
    /// back to [`PRICE_FALLBACK`].
    pub price_display: String,
    /// Effective price of a single unit, never a bundle total.
    pub price_number: Option<f64>,
    /// Units the offer applies to. Always at least 1.
    pub quantity: u32,
    /// Loyalty or membership qualifier, e.g. `"with Card"`.
    pub loyalty: Option<String>,
    pub image: Option<String>,
}

impl CanonicalDeal {
    /// Returns `true` when a numeric unit price was derived.
    #[must_use]
    pub fn is_priced(&self) -> bool {
        self.price_number.is_some()
    }

    /// Returns `true` when the offer requires a loyalty card or membership.
    #[must_use]
    pub fn requires_loyalty(&self) -> bool {
        self.loyalty.is_some()
    }
}

/// Orders deals by ascending unit price. Deals without a numeric price sort
/// last; ties keep their input order.
pub fn sort_by_unit_price(deals: &mut [CanonicalDeal]) {
    deals.sort_by(|a, b| match (a.price_number, b.price_number) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_deal(name: &str, price_number: Option<f64>) -> CanonicalDeal {
        CanonicalDeal {
            store: "Safeway".to_string(),
            name: name.to_string(),
            details: None,
            dept: Some("Dairy".to_string()),
            price_display: price_number
                .map_or_else(|| PRICE_FALLBACK.to_string(), |p| format!("${p}")),
            price_number,
            quantity: 1,
            loyalty: None,
            image: None,
        }
    }

    #[test]
    fn sort_by_unit_price_orders_ascending() {
        let mut deals = vec![
            make_deal("milk", Some(3.49)),
            make_deal("eggs", Some(1.25)),
            make_deal("butter", Some(2.0)),
        ];
        sort_by_unit_price(&mut deals);
        let names: Vec<_> = deals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["eggs", "butter", "milk"]);
    }

    #[test]
    fn sort_by_unit_price_puts_unpriced_last_and_is_stable() {
        let mut deals = vec![
            make_deal("mystery-a", None),
            make_deal("bread", Some(2.5)),
            make_deal("mystery-b", None),
            make_deal("jam", Some(2.5)),
        ];
        sort_by_unit_price(&mut deals);
        let names: Vec<_> = deals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["bread", "jam", "mystery-a", "mystery-b"]);
    }

    #[test]
    fn is_priced_and_requires_loyalty() {
        let mut deal = make_deal("cheese", None);
        assert!(!deal.is_priced());
        assert!(!deal.requires_loyalty());

        deal.price_number = Some(4.99);
        deal.loyalty = Some("with Card".to_string());
        assert!(deal.is_priced());
        assert!(deal.requires_loyalty());
    }

    #[test]
    fn serializes_with_snake_case_keys_and_nulls() {
        let deal = make_deal("yogurt", None);
        let json = serde_json::to_value(&deal).expect("serialization failed");
        assert_eq!(json["price_display"], PRICE_FALLBACK);
        assert!(json["price_number"].is_null());
        assert!(json["details"].is_null());
        assert_eq!(json["quantity"], 1);
    }
}
