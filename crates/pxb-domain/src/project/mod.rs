//! Project descriptor parsing and distribution naming.

pub(crate) mod descriptor;
pub(crate) mod names;

pub use descriptor::{ProjectDescriptor, ProjectMetadata, DESCRIPTOR_FILE, TOOL_NAMESPACE};
pub use names::{normalize_dist_name, normalize_version, DistLabel};
