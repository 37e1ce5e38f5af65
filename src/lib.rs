pub mod api;
pub mod comfort;
pub mod config;
pub mod context;
pub mod devices;
pub mod notifications;
pub mod pipeline;
pub mod preferences;
pub mod readings;
pub mod session;
pub mod storage;
pub mod units;
