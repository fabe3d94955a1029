// Defense Briefing - API Core
//
// HTTP surface over the briefing library: configuration, the axum router,
// rate limiting and process wiring. The pipeline itself lives in `briefing`.

pub mod config;
pub mod server;

pub use config::*;
