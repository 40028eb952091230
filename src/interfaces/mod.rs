pub mod fetcher;
pub mod site;

pub use fetcher::{PageFetcher, PageRequest};
pub use site::SiteProfile;
