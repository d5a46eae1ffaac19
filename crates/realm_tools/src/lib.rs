//! # Realm Development Tools
//!
//! Command-line tools for development:
//! - Balance file validation
//! - Default balance export

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
