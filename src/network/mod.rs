pub mod middleware;
pub mod service;

pub use service::HttpService;
