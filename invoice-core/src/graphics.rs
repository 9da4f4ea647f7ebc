/// RGB color for PDF graphics operations.
///
/// Each component is in the range 0.0 (none) to 1.0 (full intensity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    /// Branding color used for the issuer name, title, table header
    /// and the highlighted total.
    pub const ACCENT: Color = Color::rgb(0.45, 0.2, 0.6);
    pub const BLACK: Color = Color::gray(0.0);
    pub const WHITE: Color = Color::gray(1.0);
    /// Issuer contact lines.
    pub const MUTED: Color = Color::gray(0.4);
    /// Footer message.
    pub const FOOTER: Color = Color::gray(0.5);
    /// Background of even item rows.
    pub const STRIPE: Color = Color::gray(0.98);

    /// Create a color from RGB components (each 0.0–1.0).
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    /// Create a grayscale color (r = g = b = level).
    pub const fn gray(level: f64) -> Self {
        Color {
            r: level,
            g: level,
            b: level,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}
