//! Core types and engine pieces of the node compliance collector.
//!
//! This crate holds everything that decides *what* is collected and *how*
//! values are reconciled, independent of the host and the cluster:
//!
//! - **Types**: spec documents, parameter maps, value sets, output records
//! - **Version**: `v1.23.17-eks-8ccc7ba` → `1.23`
//! - **Catalog**: spec assets, parameter substitution, parsing
//! - **Selector**: explicit or version-mapped spec choice
//! - **Extract / Merge**: live kubelet configuration overrides
//! - **Errors**: [`CollectorError`]
//!
//! # Example
//!
//! ```rust,ignore
//! use nodecollect_core::{extract, merge, KubeletMapping, LiveConfigDocument};
//!
//! let live = extract::extract(&doc, &mapping);
//! let info = merge::merge(&probed, &live);
//! ```

mod error;

pub mod capability;
pub mod catalog;
pub mod extract;
pub mod merge;
pub mod selector;
pub mod types;
pub mod version;

pub use capability::{LiveConfigSource, NoLiveConfig, Shell, StaticLiveConfig};
pub use catalog::{AssetOverrides, AssetProvider, DirAssets, MemoryAssets, SpecCatalog, SpecSource};
pub use error::{CollectorError, Result};
pub use extract::KubeletMapping;
pub use selector::{SpecRequest, VersionMapping};
pub use types::*;
