use std::fmt;
use std::rc::Rc;

use crate::entity::{LabelStyle, PointStyle, PolygonStyle, PolylineStyle};
use crate::math::{Cartographic, Point3};

/// Computes a label's text from the vertex position, its index and every
/// position committed so far.
pub type LabelTextFn = Rc<dyn Fn(&Point3, usize, &[Point3]) -> String>;

/// Decides from the committed positions whether the shape is complete.
pub type CompletionPredicate = Rc<dyn Fn(&[Point3]) -> bool>;

/// Text of a vertex label.
#[derive(Clone)]
pub enum LabelText {
    Fixed(String),
    Computed(LabelTextFn),
}

impl LabelText {
    /// Resolves the text for the vertex at `index`.
    #[must_use]
    pub fn resolve(&self, position: &Point3, index: usize, positions: &[Point3]) -> String {
        match self {
            Self::Fixed(text) => text.clone(),
            Self::Computed(f) => f(position, index, positions),
        }
    }
}

impl Default for LabelText {
    fn default() -> Self {
        Self::Computed(Rc::new(|position, index, _| default_label_text(position, index)))
    }
}

impl fmt::Debug for LabelText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(text) => f.debug_tuple("Fixed").field(text).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// `Point n` followed by the vertex longitude and latitude in degrees.
#[must_use]
pub fn default_label_text(position: &Point3, index: usize) -> String {
    match Cartographic::from_cartesian(position) {
        Some(c) => format!(
            "Point {}\nlongitude: {}\nlatitude: {}",
            index + 1,
            c.longitude_degrees(),
            c.latitude_degrees()
        ),
        None => format!("Point {}", index + 1),
    }
}

/// How far above its vertex a label floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelHeight {
    /// A fixed offset in metres. `0.0` places the label on the vertex.
    Fixed(f64),
    /// A fraction of the camera's height above the ellipsoid, so labels stay
    /// readable at any zoom.
    CameraFraction(f64),
}

impl Default for LabelHeight {
    fn default() -> Self {
        Self::CameraFraction(0.2)
    }
}

impl LabelHeight {
    /// Resolves the offset in metres for the given camera position.
    #[must_use]
    pub fn resolve(&self, camera: &Point3) -> f64 {
        match *self {
            Self::Fixed(height) => height,
            Self::CameraFraction(fraction) => Cartographic::from_cartesian(camera)
                .map_or(0.0, |c| c.height * fraction),
        }
    }
}

/// Options for vertex labels.
#[derive(Debug, Clone, Default)]
pub struct LabelOptions {
    pub text: LabelText,
    pub height: LabelHeight,
    pub style: LabelStyle,
}

/// Configuration of a drawing session.
///
/// Decorations are disabled by setting them to `None`.
#[derive(Clone)]
pub struct DrawOptions {
    /// Point marker on every committed vertex.
    pub point: Option<PointStyle>,
    /// Label on every committed vertex.
    pub label: Option<LabelOptions>,
    pub polyline: PolylineStyle,
    /// Fill style; only used when drawing polygons.
    pub polygon: PolygonStyle,
    /// Show a live segment following the pointer before the next click.
    pub show_guidance: bool,
    /// Return to idle after one shape instead of starting the next.
    pub stop_after_finish: bool,
    /// Finish as soon as the committed positions satisfy this predicate.
    pub finish_when: Option<CompletionPredicate>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            point: Some(PointStyle::default()),
            label: Some(LabelOptions::default()),
            polyline: PolylineStyle::default(),
            polygon: PolygonStyle::default(),
            show_guidance: true,
            stop_after_finish: true,
            finish_when: None,
        }
    }
}

impl DrawOptions {
    #[must_use]
    pub fn without_points(mut self) -> Self {
        self.point = None;
        self
    }

    #[must_use]
    pub fn without_labels(mut self) -> Self {
        self.label = None;
        self
    }

    #[must_use]
    pub fn with_guidance(mut self, show: bool) -> Self {
        self.show_guidance = show;
        self
    }

    #[must_use]
    pub fn with_stop_after_finish(mut self, stop: bool) -> Self {
        self.stop_after_finish = stop;
        self
    }

    /// Finishes the shape once `predicate` holds for the committed positions.
    #[must_use]
    pub fn with_finish_when(mut self, predicate: impl Fn(&[Point3]) -> bool + 'static) -> Self {
        self.finish_when = Some(Rc::new(predicate));
        self
    }
}

impl fmt::Debug for DrawOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawOptions")
            .field("point", &self.point)
            .field("label", &self.label)
            .field("polyline", &self.polyline)
            .field("polygon", &self.polygon)
            .field("show_guidance", &self.show_guidance)
            .field("stop_after_finish", &self.stop_after_finish)
            .field("finish_when", &self.finish_when.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_text_reports_index_and_degrees() {
        let p = Cartographic::from_degrees(10.0, 20.0, 0.0).to_cartesian();
        let text = LabelText::default().resolve(&p, 2, &[]);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Point 3"));
        let lon: f64 = lines
            .next()
            .and_then(|l| l.strip_prefix("longitude: "))
            .and_then(|v| v.parse().ok())
            .unwrap_or(f64::NAN);
        assert_abs_diff_eq!(lon, 10.0, epsilon = 1e-9);
        assert!(lines.next().is_some_and(|l| l.starts_with("latitude: 20")
            || l.starts_with("latitude: 19.99")));
    }

    #[test]
    fn computed_text_sees_all_positions() {
        let text = LabelText::Computed(Rc::new(|_, index, positions| {
            format!("{}/{}", index + 1, positions.len())
        }));
        let p = Point3::origin();
        assert_eq!(text.resolve(&p, 1, &[p, p]), "2/2");
        assert_eq!(LabelText::Fixed("A".into()).resolve(&p, 7, &[]), "A");
    }

    #[test]
    fn camera_fraction_height() {
        let camera = Cartographic::from_degrees(0.0, 0.0, 5000.0).to_cartesian();
        assert_abs_diff_eq!(LabelHeight::default().resolve(&camera), 1000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(LabelHeight::Fixed(42.0).resolve(&camera), 42.0);
    }

    #[test]
    fn builder_toggles() {
        let options = DrawOptions::default()
            .without_points()
            .without_labels()
            .with_guidance(false)
            .with_stop_after_finish(false)
            .with_finish_when(|positions| positions.len() >= 3);
        assert!(options.point.is_none());
        assert!(options.label.is_none());
        assert!(!options.show_guidance);
        assert!(!options.stop_after_finish);
        assert!(options.finish_when.is_some_and(|f| f(&[Point3::origin(); 3])));
    }
}
