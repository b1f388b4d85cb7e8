//! Extraction of typed feed items from a rendered dynamics page.

pub mod collect;
pub mod model;
pub mod parse;
pub mod selectors;
pub mod snapshot;

pub use collect::{collect, tally, CollectMode, RoundTally};
pub use model::{AuthorRef, Category, DebugRaw, FeedItem, ForwardInfo, ItemKind, VideoInfo};
pub use snapshot::FeedSnapshot;
