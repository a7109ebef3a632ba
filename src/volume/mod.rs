//! Volume module
//!
//! Static mapping from logical volume ids to host root directories.

mod registry;

pub use registry::{Volume, VolumeRegistry};
