//! Terminal and JSON rendering of batch reports.
//!
//! Every print function takes an injected writer so tests capture output
//! without touching stdout.

pub mod progress;
pub mod reports;
pub mod summary;
pub mod tables;
