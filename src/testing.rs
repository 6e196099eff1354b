//! Test doubles shared by unit tests.

use crate::host::{DataSourceCollection, Gesture, Viewer};
use crate::math::{Cartographic, Point2, Point3};

/// Installs a tracing subscriber that writes through the test harness.
pub(crate) fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::DEBUG.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// A viewer whose globe is a lon/lat grid: window `(x, y)` picks the ground
/// point at longitude `x`, latitude `y` degrees. Negative coordinates are
/// off the globe.
#[derive(Debug)]
pub(crate) struct MockViewer {
    pub data_sources: DataSourceCollection,
    pub camera: Point3,
    pub listening: Vec<Gesture>,
    pub releases: usize,
}

impl MockViewer {
    pub(crate) fn new() -> Self {
        Self {
            data_sources: DataSourceCollection::new(),
            camera: Cartographic::from_degrees(0.0, 0.0, 10_000.0).to_cartesian(),
            listening: Vec::new(),
            releases: 0,
        }
    }
}

/// The world position [`MockViewer`] picks for window `(x, y)`.
pub(crate) fn ground(x: f64, y: f64) -> Point3 {
    Cartographic::from_degrees(x, y, 0.0).to_cartesian()
}

impl Viewer for MockViewer {
    fn pick_position(&self, window_position: Point2) -> Option<Point3> {
        if window_position.x < 0.0 || window_position.y < 0.0 {
            return None;
        }
        Some(ground(window_position.x, window_position.y))
    }

    fn camera_position(&self) -> Point3 {
        self.camera
    }

    fn data_sources(&self) -> &DataSourceCollection {
        &self.data_sources
    }

    fn data_sources_mut(&mut self) -> &mut DataSourceCollection {
        &mut self.data_sources
    }

    fn listen(&mut self, gestures: &[Gesture]) {
        self.listening = gestures.to_vec();
    }

    fn release(&mut self) {
        self.listening.clear();
        self.releases += 1;
    }
}
