//! API endpoint groups.

mod nodes;
mod version;

pub use nodes::NodesApi;
pub use version::VersionApi;
