pub mod dedup;
pub mod listennotes;
pub mod mappers;
pub mod podscan;
pub mod retry;
pub mod rss;

pub use dedup::dedupe_and_merge;
pub use listennotes::{ListenNotesClient, ListenNotesPodcast};
pub use mappers::{map_listennotes, map_podscan};
pub use podscan::{PodscanClient, PodscanPodcast};
pub use retry::{AttemptOutcome, RetryPolicy};
pub use rss::{RssFeedInfo, RssParser};
