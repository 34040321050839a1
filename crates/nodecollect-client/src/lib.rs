//! Kubernetes API client for the node collector.
//!
//! Only two endpoints are read: `/version` for the cluster version and the
//! node proxy's `configz` for the running kubelet configuration.
//! [`KubeClient`] implements [`nodecollect_core::LiveConfigSource`].

#![doc(html_root_url = "https://docs.rs/nodecollect-client/0.1.0")]

mod client;
mod config;
pub mod api;

pub use client::{KubeClient, KubeClientBuilder};
pub use config::*;
pub use nodecollect_core::{CollectorError, Result};
