//! # CUtil - Common Utilities Library
//!
//! Small helpers shared by the aging tools.
//!
//! ## Features
//!
//! - `time`: Local timestamps for log lines
//! - `archive`: Packing encoded outputs into a `.tar.gz` and deriving their names

#[cfg(feature = "time")]
pub mod time;

#[cfg(feature = "archive")]
pub mod archive;
