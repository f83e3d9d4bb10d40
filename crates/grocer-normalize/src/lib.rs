pub mod error;
pub mod feed;
pub mod normalize;
pub mod parse;

pub use error::NormalizeError;
pub use feed::{extract_records, normalize_all, normalize_feed, FeedNormalizer};
pub use normalize::{derive_price, normalize_deal, DerivedPrice, PriceRule};
