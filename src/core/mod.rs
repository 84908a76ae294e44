//! Core types shared across featgate.
//!
//! Currently this is the error taxonomy; every fallible public operation in
//! the crate returns [`Result`] with the [`Error`] enum defined here.

pub mod error;

pub use error::{Error, Result};
