pub mod feed;
pub mod post;
pub mod search;

pub use feed::FeedMetadata;
pub use post::{PostContent, PostRecord};
pub use search::SearchHit;
