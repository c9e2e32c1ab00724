pub mod feed;
pub mod identity;
pub mod item;

pub use feed::FeedMeta;
pub use identity::ItemIdentity;
pub use item::{FeedItem, TransformedItem};
