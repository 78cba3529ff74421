pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod socket;
pub mod sse;
pub mod state;

pub use error::HttpServerError;
pub use state::AppState;
