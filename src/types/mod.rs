// ABOUTME: Typed identifiers and small validated domain types.
// ABOUTME: Bundle types derived from object keys and the region name table.

mod bundle_type;
mod id;
pub mod region;

pub use bundle_type::{BundleType, BundleTypeError};
pub use id::{DeploymentId, Id};
pub use region::{RegionError, region_name};
