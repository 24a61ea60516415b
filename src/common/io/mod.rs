mod geojson;

pub use geojson::*;
