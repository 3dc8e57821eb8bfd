//! Paint descriptions for overlay layers
//!
//! Each overlay hands the surface a plain value describing what the layer
//! should show. Hosts translate these into whatever their renderer uses.

use serde::{Deserialize, Serialize};

use crate::host::{ContentSnapshot, Point};
use crate::overlay::magnifier::LensTransform;

/// Straight-alpha RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity (0.0 - 1.0)
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba()` notation
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Reading mask: shade everything except a horizontal band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskPaint {
    /// Top edge of the clear band
    pub band_top: f32,
    /// Bottom edge of the clear band
    pub band_bottom: f32,
    /// Colour outside the band
    pub shade: Rgba,
}

impl MaskPaint {
    /// Band of `band_height` centred on `y`
    pub fn centered_on(y: f32, band_height: f32, shade: Rgba) -> Self {
        let half = band_height / 2.0;
        Self {
            band_top: y - half,
            band_bottom: y + half,
            shade,
        }
    }

    /// Vertical centre of the band
    pub fn center(&self) -> f32 {
        (self.band_top + self.band_bottom) / 2.0
    }

    /// Hard-stop CSS gradient. Repeated stop positions give sharp edges.
    pub fn to_css(&self) -> String {
        let shade = self.shade.to_css();
        let clear = Rgba::TRANSPARENT.to_css();
        format!(
            "linear-gradient(to bottom, {shade} 0px, {shade} {top}px, {clear} {top}px, {clear} {bottom}px, {shade} {bottom}px, {shade} 100%)",
            top = self.band_top,
            bottom = self.band_bottom,
        )
    }
}

/// Reading guide: a thin horizontal line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidePaint {
    /// Vertical coordinate the line is centred on
    pub y: f32,
    pub thickness: f32,
    pub color: Rgba,
}

/// Magnifier lens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensPaint {
    pub visible: bool,
    /// Lens centre on the surface
    pub center: Point,
    pub diameter: f32,
    /// Copy of the magnified element
    pub content: Option<ContentSnapshot>,
    /// Placement of `content` inside the lens
    pub transform: Option<LensTransform>,
}

impl LensPaint {
    pub fn hidden(diameter: f32) -> Self {
        Self {
            visible: false,
            center: Point::default(),
            diameter,
            content: None,
            transform: None,
        }
    }
}

/// Paint for any overlay layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerPaint {
    Mask(MaskPaint),
    Guide(GuidePaint),
    Lens(LensPaint),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_band_is_centered() {
        let paint = MaskPaint::centered_on(300.0, 100.0, Rgba::new(0, 0, 0, 0.65));
        assert_eq!(paint.band_top, 250.0);
        assert_eq!(paint.band_bottom, 350.0);
        assert_eq!(paint.center(), 300.0);
    }

    #[test]
    fn test_mask_css_has_hard_stops() {
        let paint = MaskPaint::centered_on(100.0, 100.0, Rgba::new(0, 0, 0, 0.65));
        let css = paint.to_css();
        assert!(css.contains("rgba(0, 0, 0, 0.65) 50px, rgba(0, 0, 0, 0) 50px"));
        assert!(css.contains("rgba(0, 0, 0, 0) 150px, rgba(0, 0, 0, 0.65) 150px"));
    }
}
