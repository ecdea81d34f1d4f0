//! Promoserve - promotional content serving engine
//!
//! Decides, for a page location and visitor context, which promotional
//! content unit (if any) to display, coalesces concurrent resolution work
//! behind a context-keyed cache, and keeps a capped engagement event log.
//!
//! # Architecture
//! - `storage`: key-value stores, data model and the content repository
//! - `resolve`: eligibility, ranking, rotation and single-winner resolution
//! - `cache`: context fingerprints and the coalescing cache
//! - `services`: cache-fronted serving and the authoring boundary
//! - `analytics`: impression / click tracking and statistics
//! - `interfaces`: command-line interface
//! - `config`: Configuration management
//! - `runtime`: component wiring
//! - `system`: logging initialisation

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod resolve;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
