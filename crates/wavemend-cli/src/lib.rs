//! wavemend CLI library.
//!
//! File discovery, profile loading and the `inspect`/`restore` commands. The
//! byte-level work lives in `wavemend-core`; everything here deals with paths,
//! the filesystem and presentation.

pub mod commands;
pub mod config;
pub mod input;
pub mod logging;
