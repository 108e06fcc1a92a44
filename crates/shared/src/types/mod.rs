//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{format_percent, format_usd};
pub use pagination::{DEFAULT_PAGE_SIZE, RowRange};
