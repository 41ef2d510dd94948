//! Configuration loading and schema definitions
//!
//! Every value has a default, so a missing or empty file yields the stock
//! search limits.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
