pub mod aggregate;
pub mod buffer;
pub mod dashboard;
pub mod events;
pub mod generator;
pub mod query;
pub mod service;
pub mod snapshot;
pub mod types;

pub use dashboard::Dashboard;
pub use service::RefreshService;
