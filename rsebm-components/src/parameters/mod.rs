mod physical;
mod store;
mod zones;

pub use physical::{PhysicalConstants, SurfaceProperties, SurfaceType};
pub use store::{ModelParameters, ParameterStore};
pub use zones::{BoundaryConfig, ZoneConfig};
