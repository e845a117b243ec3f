pub mod plate;

pub use plate::{PlatePolygon, PlateSet};
