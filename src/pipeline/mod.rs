pub mod filter;
pub mod service;
pub mod state;

pub use filter::Filter;
pub use service::{PipelineEvent, RefreshPipeline};
pub use state::{AutoRefresh, DashboardView};
