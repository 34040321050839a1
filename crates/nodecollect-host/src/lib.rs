//! Host-side integrations for the node collector.
//!
//! Everything here touches the node itself through a [`Shell`]:
//!
//! - [`shell::HostShell`]: `sh -c` via `tokio::process`
//! - [`probe`]: discovery of binaries, config files and data directories
//! - [`role`]: master / worker detection
//! - [`audit`]: execution of spec audit entries
//!
//! [`Shell`]: nodecollect_core::Shell

#![doc(html_root_url = "https://docs.rs/nodecollect-host/0.1.0")]

pub mod audit;
pub mod probe;
pub mod role;
pub mod shell;

pub use audit::run_audits;
pub use probe::probe_parameters;
pub use role::detect_role;
pub use shell::HostShell;
