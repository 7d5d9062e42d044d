pub mod events;
pub mod fetch;
pub mod store;

pub use events::{ListChange, ListChangeBus};
pub use fetch::{ChannelFetcher, FetchError, PageFetcher, PageRequest};
pub use store::{ListSlot, PagedItemStore};
