//! Kuuburi Application Library
//!
//! Book-recommendation application core: domain modules, the session view
//! controller, and shared utilities.

pub mod modules;
pub mod session;
pub mod utils;

/// Re-export commonly used types
pub use session::{Page, ProfileTab, Session, SortMode};
