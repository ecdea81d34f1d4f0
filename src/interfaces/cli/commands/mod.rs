//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config_management;
mod content_management;
mod engagement;
mod helpers;
mod serving;

pub use config_management::*;
pub use content_management::*;
pub use engagement::*;
pub use serving::*;
