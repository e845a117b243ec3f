pub mod area;
pub mod bounds;

pub use area::{AreaEngine, GeometryError, polygon_area};
pub use bounds::Bounds;
