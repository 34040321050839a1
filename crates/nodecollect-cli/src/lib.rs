//! # nodecollect-cli
//!
//! Command-line interface of the node compliance data collector.
//!
//! ## Features
//!
//! - **Collection**: probe the node, run spec audits, overlay the live
//!   kubelet configuration
//! - **Offline inputs**: base64 overrides for every configuration document
//!   and for the kubelet configuration itself
//! - **Multiple output formats**: JSON, YAML, tables

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
