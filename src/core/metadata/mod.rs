mod mod_data;
mod version;

pub use mod_data::{DependencyDescriptor, ModData, PackageData};
pub use version::{VersionData, VersionTriple};
