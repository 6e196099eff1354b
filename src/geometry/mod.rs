//! Stateless geometry utilities on the WGS84 globe.

mod height;
mod local_frame;
mod orientation;
mod regular_polygon;

pub use height::{add_height, set_height};
pub use local_frame::{to_local_frame, LocalFrame};
pub use orientation::{heading_degrees, pitch_degrees};
pub use regular_polygon::regular_polygon_vertices;
