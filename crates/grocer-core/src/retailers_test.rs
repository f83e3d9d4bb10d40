use std::path::Path;

use super::*;

fn parse_file(yaml: &str) -> RetailersFile {
    serde_yaml::from_str(yaml).expect("test YAML should parse")
}

#[test]
fn classify_matches_configured_tags() {
    let kinds = RetailerRules::king_soopers().pricing_kinds;
    assert_eq!(kinds.classify("_KRGR_2FOR"), Some(PricingKind::TwoFor));
    assert_eq!(kinds.classify("_KRGR_BOGO"), Some(PricingKind::BuyOneGetOneFree));
    assert_eq!(
        kinds.classify("_KRGR_BOGO %"),
        Some(PricingKind::BuyOneGetOnePercentOff)
    );
}

#[test]
fn classify_ignores_case_and_padding() {
    let kinds = RetailerRules::king_soopers().pricing_kinds;
    assert_eq!(kinds.classify("  _krgr_2for "), Some(PricingKind::TwoFor));
}

#[test]
fn classify_unknown_tag_is_none() {
    let kinds = RetailerRules::king_soopers().pricing_kinds;
    assert_eq!(kinds.classify("_KRGR_SALE"), None);
    assert_eq!(kinds.classify(""), None);
}

#[test]
fn pricing_kind_display() {
    assert_eq!(PricingKind::TwoFor.to_string(), "two_for");
    assert_eq!(
        PricingKind::BuyOneGetOnePercentOff.to_string(),
        "buy_one_get_one_percent_off"
    );
}

#[test]
fn builtin_tables_validate() {
    RetailerRules::king_soopers().validate().unwrap();
    RetailerRules::safeway().validate().unwrap();
}

#[test]
fn field_map_defaults_image_url_key() {
    let file = parse_file(
        r"
retailers:
  - name: corner-market
    store_label: Corner Market
    fields:
      name: title
      listed_price: price
",
    );
    let rules = &file.retailers[0];
    assert_eq!(rules.fields.image_url_key, "url");
    assert!(rules.records_path.is_empty());
    assert!(rules.pricing_kinds.is_empty());
    assert!(!rules.fields.has_price_fragments());
}

#[test]
fn validate_rejects_empty_name() {
    let mut rules = RetailerRules::safeway();
    rules.name = "  ".to_string();
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("name must be non-empty"));
}

#[test]
fn validate_rejects_empty_store_label() {
    let mut rules = RetailerRules::safeway();
    rules.store_label = String::new();
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("empty store_label"));
}

#[test]
fn validate_rejects_missing_price_source() {
    let mut rules = RetailerRules::safeway();
    rules.fields.price_text = None;
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("listed_price or price_text"));
}

#[test]
fn validate_rejects_tags_without_pricing_kind_field() {
    let mut rules = RetailerRules::king_soopers();
    rules.fields.pricing_kind = None;
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("no pricing_kind field"));
}

#[test]
fn validate_rejects_percent_tags_without_percent_field() {
    let mut rules = RetailerRules::king_soopers();
    rules.fields.percent_off = None;
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("no percent_off field"));
}

#[test]
fn validate_rejects_tag_mapped_twice() {
    let mut rules = RetailerRules::king_soopers();
    rules
        .pricing_kinds
        .buy_one_get_one_free
        .push("_krgr_2for".to_string());
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("more than once"));
}

#[test]
fn validate_rejects_blank_records_path_segment() {
    let mut rules = RetailerRules::king_soopers();
    rules.records_path.push(String::new());
    let err = rules.validate().unwrap_err();
    assert!(err.to_string().contains("records_path"));
}

#[test]
fn validate_retailers_rejects_duplicate_names() {
    let mut second = RetailerRules::safeway();
    second.name = "SAFEWAY".to_string();
    let file = RetailersFile {
        retailers: vec![RetailerRules::safeway(), second],
    };
    let err = validate_retailers(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate retailer name")));
}

#[test]
fn find_is_case_insensitive() {
    let file = RetailersFile {
        retailers: vec![RetailerRules::king_soopers(), RetailerRules::safeway()],
    };
    assert_eq!(
        file.find("Safeway").map(|r| r.store_label.as_str()),
        Some("Safeway")
    );
    assert!(file.find("albertsons").is_none());
}

#[test]
fn load_retailers_missing_file_is_io_error() {
    let err = load_retailers(Path::new("/nonexistent/retailers.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::RetailersFileIo { .. }));
}

#[test]
fn load_retailers_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("retailers.yaml");
    assert!(
        path.exists(),
        "retailers.yaml missing at {path:?}; required for this test"
    );
    let file = load_retailers(&path).expect("failed to load retailers.yaml");

    // The checked-in tables must agree with the built-in constructors.
    assert_eq!(file.find("king-soopers"), Some(&RetailerRules::king_soopers()));
    assert_eq!(file.find("safeway"), Some(&RetailerRules::safeway()));
}
