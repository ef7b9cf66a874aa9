// ABOUTME: Core podcast feed normalization library for podscrape.
// ABOUTME: Turns RSS bytes into Show/Episode records and classifies user-supplied source URLs.

pub mod categories;
pub mod decode;
pub mod document;
pub mod duration_parse;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod persons;
pub mod source;
pub mod time_parse;
pub mod xml_tree;

pub use categories::normalize_categories;
pub use decode::{declared_encoding, decode_feed_bytes};
pub use document::{CategoryNode, ChannelNode, EnclosureNode, FeedDocument, ItemNode, OwnerNode, PersonNode};
pub use duration_parse::{parse_duration, parse_duration_seconds, DurationValue};
pub use error::FeedError;
pub use models::{Categories, Episode, NormalizedFeed, PersonCredit, Show};
pub use normalizer::{is_explicit, normalize_feed, parse_feed_bytes};
pub use persons::normalize_persons;
pub use source::{
    classify_url, extract_catalog_ref, is_catalog_url, CatalogEntry, CatalogRef, ResolvedSource,
    SourceUrl,
};
pub use time_parse::parse_feed_date;
