//! Cinefeed - Media discovery front-end core
//!
//! This library crate assembles the hero carousel, the home rows, and the
//! continue-watching list from a media catalog, for any presentation layer
//! (and for integration testing).

pub mod catalog;
pub mod config;
pub mod continue_watching;
pub mod hero;
pub mod rows;
