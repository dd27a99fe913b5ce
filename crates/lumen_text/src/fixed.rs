//! 26.6 fixed-point helpers
//!
//! Metrics and advances are kept in the rasterization engine's native 26.6
//! format (6 fractional bits) and truncated to whole pixels with `>> 6`.

/// A 26.6 fixed-point value
pub type F26Dot6 = i32;

/// One pixel in 26.6 units
pub const ONE: F26Dot6 = 64;

pub fn from_f32(v: f32) -> F26Dot6 {
    (v * ONE as f32).round() as F26Dot6
}

pub fn to_f32(v: F26Dot6) -> f32 {
    v as f32 / ONE as f32
}

pub const fn from_int(px: i32) -> F26Dot6 {
    px * ONE
}

/// Whole pixels, rounding toward negative infinity (`>> 6`)
pub const fn trunc(v: F26Dot6) -> i32 {
    v >> 6
}

pub const fn floor(v: F26Dot6) -> F26Dot6 {
    v & !63
}

pub const fn ceil(v: F26Dot6) -> F26Dot6 {
    (v + 63) & !63
}

pub const fn round(v: F26Dot6) -> F26Dot6 {
    (v + 32) & !63
}
