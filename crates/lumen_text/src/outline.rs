//! Outline geometry helpers
//!
//! Glyph outlines are swash [`Outline`]s in pixel units with the y axis
//! pointing up (baseline at y = 0). Style transforms run on them in place;
//! the helpers here snap their bounds to the pixel grid.

use swash::scale::outline::Outline;
use swash::zeno::{Angle, Bounds, Transform};

/// Integer pixel box, y up. `x_min` is the left bearing and `y_max` the top bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl PixelBox {
    /// Box of a `width` x `height` bitmap whose top-left corner sits at (`left`, `top`)
    pub fn from_placement(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            x_min: left,
            y_min: top - height as i32,
            x_max: left + width as i32,
            y_max: top,
        }
    }

    /// Snap `bounds` outward to whole pixels
    pub fn grid_fit(bounds: &Bounds) -> Self {
        Self {
            x_min: bounds.min.x.floor() as i32,
            y_min: bounds.min.y.floor() as i32,
            x_max: bounds.max.x.ceil() as i32,
            y_max: bounds.max.y.ceil() as i32,
        }
    }

    pub fn width(&self) -> u32 {
        (self.x_max - self.x_min).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y_max - self.y_min).max(0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Smallest box containing both, edge by edge
    pub fn union(&self, other: &PixelBox) -> PixelBox {
        PixelBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// Bounds of an outline's points, or `None` when it has no geometry
pub fn outline_bounds(outline: &Outline) -> Option<Bounds> {
    if outline.points().is_empty() {
        return None;
    }
    Some(outline.bounds())
}

/// Grow every edge of `bounds` outward by `amount` pixels
pub fn expand_bounds(bounds: &Bounds, amount: f32) -> Bounds {
    let mut grown = *bounds;
    grown.min.x -= amount;
    grown.min.y -= amount;
    grown.max.x += amount;
    grown.max.y += amount;
    grown
}

/// Horizontal shear moving points right by `factor` times their height
pub fn italic_transform(factor: f32) -> Transform {
    Transform::skew(Angle::from_radians(factor.atan()), Angle::ZERO)
}

/// Map y-up outline space onto a y-down mask whose top-left corner is `pixels`' top-left
pub fn mask_transform(pixels: &PixelBox) -> Transform {
    Transform::new(1.0, 0.0, 0.0, -1.0, -pixels.x_min as f32, pixels.y_max as f32)
}
