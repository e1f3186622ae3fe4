//! Domain primitives shared by the persistence and HTTP layers.
//!
//! Nothing in this crate performs I/O: password digests, token secrets,
//! input validation and the common error type all live here so they can be
//! unit tested without a database.

pub mod error;
pub mod hashing;
pub mod password;
pub mod tokens;
pub mod types;
pub mod validation;
