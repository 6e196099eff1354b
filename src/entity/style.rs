/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Appearance of a vertex point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStyle {
    pub pixel_size: f64,
    pub color: Color,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            pixel_size: 10.0,
            color: Color::WHITE,
        }
    }
}

/// Appearance of a vertex label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font: String,
    pub fill_color: Color,
    pub show_background: bool,
    pub background_color: Color,
    /// Horizontal and vertical padding in pixels.
    pub background_padding: (f64, f64),
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: "14px sans-serif".to_owned(),
            fill_color: Color::WHITE,
            show_background: true,
            background_color: Color::BLACK.with_alpha(0.5),
            background_padding: (4.0, 6.0),
        }
    }
}

/// Appearance of a shape outline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineStyle {
    pub material: Color,
    pub width: f64,
    pub clamp_to_ground: bool,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            material: Color::YELLOW,
            width: 5.0,
            clamp_to_ground: true,
        }
    }
}

/// Appearance of a polygon fill.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStyle {
    pub material: Color,
}

impl Default for PolygonStyle {
    fn default() -> Self {
        Self {
            material: Color::YELLOW.with_alpha(0.6),
        }
    }
}
