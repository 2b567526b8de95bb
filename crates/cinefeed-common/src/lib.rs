//! Cinefeed-Common: Shared types and errors.
//!
//! This crate provides the pieces every other part of cinefeed agrees on:
//!
//! - **Typed IDs**: [`MediaId`] wraps the catalog's integer identifier and
//!   [`MediaKey`] pairs it with a [`MediaKind`]
//! - **Core Types**: the movie / series distinction and its wire names
//! - **Error Handling**: a common error type and result alias
//!
//! # Examples
//!
//! ```
//! use cinefeed_common::{Error, MediaKey, MediaKind, Result};
//!
//! let key = MediaKey::new(MediaKind::Series, 1399u64);
//! assert_eq!(key.to_string(), "tv/1399");
//!
//! fn example() -> Result<()> {
//!     Err(Error::status(404, "/tv/1399/images"))
//! }
//! assert!(!example().unwrap_err().is_transient());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
