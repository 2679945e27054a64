//! HTTP front end for `filescout`: a static file server with a search endpoint.
pub mod routes;

pub use routes::{router, AppState, SEARCH_ERROR_BODY};
