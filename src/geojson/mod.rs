pub mod parser;

pub use parser::{load_plates, parse_plates};
