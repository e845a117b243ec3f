pub mod source;

pub use source::{Feature, FeatureCollection, Geometry, fetch_plates};
