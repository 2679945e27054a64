pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{ConfigOverrides, ServerConfig};
pub use errors::{SearchError, SearchResult};
pub use metrics::{SearchMetrics, SearchStats};
pub use results::SearchOutput;
pub use search::{search, search_with_cancel, MatchTarget, SearchRequest};
