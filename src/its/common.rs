//! Common utilities module
//!
//! This module contains the error types shared by every check.

pub mod error;

pub use error::{CaptureError, CheckError, Result};
