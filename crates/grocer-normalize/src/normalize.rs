//! Normalization from decoded retailer deal records to [`CanonicalDeal`].
//!
//! Field locations come from the retailer's [`RetailerRules`]; the pricing
//! rules below are shared by every retailer. Numeric and text parsing is
//! delegated to [`crate::parse`].

use grocer_core::{CanonicalDeal, FieldMap, PricingKind, RetailerRules, PRICE_FALLBACK};
use serde_json::Value;

use crate::parse::{
    classify_multi_buy, format_percent, mentions_loyalty, parse_percent, parse_price,
    parse_price_text, parse_quantity, ListedPrice, MultiBuy,
};

/// The pricing rule that produced a record's price fields, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRule {
    TwoFor,
    BuyOneGetOneFree,
    BuyOneGetOnePercentOff,
    MultiQuantity,
    Plain,
    Fragmented,
    Unpriced,
}

/// Price fields derived for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPrice {
    pub rule: PriceRule,
    pub display: String,
    pub unit_price: Option<f64>,
    pub quantity: u32,
    /// Loyalty text recovered from the price fragments, if any.
    pub loyalty_hint: Option<String>,
}

impl DerivedPrice {
    fn unpriced() -> Self {
        Self {
            rule: PriceRule::Unpriced,
            display: PRICE_FALLBACK.to_string(),
            unit_price: None,
            quantity: 1,
            loyalty_hint: None,
        }
    }
}

/// Normalizes one decoded deal record using `rules`.
///
/// Never fails: missing or malformed fields degrade to `None`, quantity 1, or
/// the [`PRICE_FALLBACK`] display text.
#[must_use]
pub fn normalize_deal(raw: &Value, rules: &RetailerRules) -> CanonicalDeal {
    let fields = &rules.fields;
    let store = rules.store_label.as_str();

    let name = derive_name(raw, fields);
    if name.is_empty() {
        tracing::debug!(store, key = %fields.name, "deal record has no name");
    }

    let price = derive_price(raw, rules);
    tracing::trace!(store, %name, rule = ?price.rule, "derived deal price");

    let loyalty = text_field(raw, fields.loyalty.as_deref()).or(price.loyalty_hint);

    CanonicalDeal {
        store: rules.store_label.clone(),
        name,
        details: fields
            .details
            .iter()
            .find_map(|key| text_field(raw, Some(key.as_str()))),
        dept: derive_dept(raw, fields),
        price_display: price.display,
        price_number: price.unit_price,
        quantity: price.quantity,
        loyalty,
        image: derive_image(raw, fields),
    }
}

/// Applies the pricing rules in precedence order: structured promotion
/// kinds, explicit multi-quantity, plain listed price, fragmented price text,
/// and finally the unpriced fallback.
#[must_use]
pub fn derive_price(raw: &Value, rules: &RetailerRules) -> DerivedPrice {
    let fields = &rules.fields;
    let store = rules.store_label.as_str();

    let listed = field(raw, fields.listed_price.as_deref()).and_then(|value| {
        let parsed = parse_price(value);
        if parsed.is_none() {
            tracing::debug!(store, %value, "unparseable listed price; treating as absent");
        }
        parsed
    });

    if let Some(price) = listed {
        let kind = pricing_kind(raw, rules);
        let percent = field(raw, fields.percent_off.as_deref()).and_then(parse_percent);
        let quantity = field(raw, fields.quantity.as_deref())
            .and_then(parse_quantity)
            .unwrap_or(1);
        return structured_price(&price, kind, percent, quantity);
    }

    fragmented_price(raw, fields).unwrap_or_else(DerivedPrice::unpriced)
}

fn pricing_kind(raw: &Value, rules: &RetailerRules) -> Option<PricingKind> {
    let tag = text_field(raw, rules.fields.pricing_kind.as_deref())?;
    let kind = rules.pricing_kinds.classify(&tag);
    match kind {
        Some(kind) => {
            tracing::trace!(store = %rules.store_label, %tag, %kind, "classified pricing kind");
        }
        None => tracing::debug!(store = %rules.store_label, %tag, "unrecognized pricing kind"),
    }
    kind
}

fn structured_price(
    price: &ListedPrice,
    kind: Option<PricingKind>,
    percent: Option<f64>,
    quantity: u32,
) -> DerivedPrice {
    let p = price.amount;
    let shown = &price.display;

    match (kind, percent) {
        (Some(PricingKind::TwoFor), _) => {
            return bundle(PriceRule::TwoFor, format!("2 for ${shown}"), p / 2.0);
        }
        (Some(PricingKind::BuyOneGetOneFree), _) => {
            return bundle(
                PriceRule::BuyOneGetOneFree,
                format!("Buy 1 Get 1 Free (${shown} each)"),
                p / 2.0,
            );
        }
        (Some(PricingKind::BuyOneGetOnePercentOff), Some(pct)) => {
            // First unit at full price, second unit discounted.
            let total = p * (1.0 + (1.0 - pct / 100.0));
            return bundle(
                PriceRule::BuyOneGetOnePercentOff,
                format!("Buy 1 Get 1 {}% Off (${shown} each)", format_percent(pct)),
                total / 2.0,
            );
        }
        _ => {}
    }

    if quantity > 1 {
        DerivedPrice {
            rule: PriceRule::MultiQuantity,
            display: format!("{quantity} for ${shown}"),
            unit_price: Some(p / f64::from(quantity)),
            quantity,
            loyalty_hint: None,
        }
    } else {
        DerivedPrice {
            rule: PriceRule::Plain,
            display: format!("${shown}"),
            unit_price: Some(p),
            quantity: 1,
            loyalty_hint: None,
        }
    }
}

fn bundle(rule: PriceRule, display: String, unit_price: f64) -> DerivedPrice {
    DerivedPrice {
        rule,
        display,
        unit_price: Some(unit_price),
        quantity: 2,
        loyalty_hint: None,
    }
}

/// Derives price fields from pre/price/post text fragments such as
/// `"3 for" / "$6.00" / "with Card"`. Returns `None` when every fragment is
/// absent or blank.
fn fragmented_price(raw: &Value, fields: &FieldMap) -> Option<DerivedPrice> {
    if !fields.has_price_fragments() {
        return None;
    }

    let pre = text_field(raw, fields.pre_price_text.as_deref());
    let price_text = price_fragment(raw, fields.price_text.as_deref());
    let post = text_field(raw, fields.post_price_text.as_deref());

    let display = [pre.as_deref(), price_text.as_deref(), post.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if display.is_empty() {
        return None;
    }

    let multi_buy = pre
        .as_deref()
        .map_or(MultiBuy::NotMultiBuy, classify_multi_buy);
    let quantity = match multi_buy {
        MultiBuy::Count(quantity) => quantity,
        MultiBuy::NotMultiBuy | MultiBuy::Unusable => 1,
    };

    let parsed = price_text.as_deref().and_then(parse_price_text);
    if parsed.is_none() && price_text.is_some() {
        tracing::debug!(price_text = ?price_text, "unparseable price text; unit price unknown");
    }
    let unit_price = if multi_buy == MultiBuy::Unusable {
        tracing::debug!(pre = ?pre, "unusable multi-buy count; unit price unknown");
        None
    } else {
        parsed.map(|p| p.amount / f64::from(quantity))
    };

    let loyalty_hint = post.filter(|text| mentions_loyalty(text));

    Some(DerivedPrice {
        rule: PriceRule::Fragmented,
        display,
        unit_price,
        quantity,
        loyalty_hint,
    })
}

fn derive_name(raw: &Value, fields: &FieldMap) -> String {
    let name = text_field(raw, Some(fields.name.as_str())).unwrap_or_default();
    match text_field(raw, fields.brand.as_deref()) {
        Some(brand) if name.is_empty() => brand,
        Some(brand) => format!("{brand} {name}"),
        None => name,
    }
}

fn derive_dept(raw: &Value, fields: &FieldMap) -> Option<String> {
    let entries = field(raw, fields.categories.as_deref())?.as_array()?;

    let names: Vec<&str> = entries
        .iter()
        .filter_map(|entry| match (entry, fields.category_key.as_deref()) {
            (Value::String(s), _) => Some(s.as_str()),
            (Value::Object(_), Some(key)) => entry.get(key).and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Takes the first image entry, either a bare URL string or an object with
/// the URL under `image_url_key`. A scalar images field counts as one entry.
fn derive_image(raw: &Value, fields: &FieldMap) -> Option<String> {
    let images = field(raw, fields.images.as_deref())?;
    let first = match images {
        Value::Array(entries) => entries.first()?,
        other => other,
    };

    let url = match first {
        Value::String(s) => s.as_str(),
        Value::Object(_) => first.get(&fields.image_url_key)?.as_str()?,
        _ => return None,
    };

    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Looks up a mapped key, treating JSON `null` as absent.
fn field<'a>(raw: &'a Value, key: Option<&str>) -> Option<&'a Value> {
    key.and_then(|k| raw.get(k)).filter(|v| !v.is_null())
}

/// Like [`text_field`], but a JSON number is rendered as its text.
fn price_fragment(raw: &Value, key: Option<&str>) -> Option<String> {
    match field(raw, key)? {
        Value::Number(n) => Some(n.to_string()),
        _ => text_field(raw, key),
    }
}

/// Looks up a mapped key holding non-blank text, trimmed.
fn text_field(raw: &Value, key: Option<&str>) -> Option<String> {
    field(raw, key)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
