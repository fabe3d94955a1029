// HTTP routes
pub mod ai;
pub mod health;

pub use ai::*;
pub use health::*;
