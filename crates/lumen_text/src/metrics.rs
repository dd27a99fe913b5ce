//! Font and text measurement values

/// Line metrics of a font at one pixel size, in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    /// Baseline-to-baseline distance
    pub height: f32,
    /// Baseline to ascender (positive)
    pub ascent: f32,
    /// Baseline to descender (positive)
    pub descent: f32,
    /// `height - (ascent + descent)`
    pub natural_leading: f32,
}

/// Script-facing font metrics object
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub height: f32,
    pub ascent: f32,
    pub descent: f32,
    pub natural_leading: f32,
    /// Distance from the top of a line to its baseline
    pub baseline: f32,
}

impl From<FontMetrics> for TextMetrics {
    fn from(m: FontMetrics) -> Self {
        Self {
            height: m.height,
            ascent: m.ascent,
            descent: m.descent,
            natural_leading: m.natural_leading,
            baseline: m.ascent,
        }
    }
}

/// Script-facing text size object
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMeasurement {
    pub w: f32,
    pub h: f32,
}

impl TextMeasurement {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_follows_ascent() {
        let metrics = TextMetrics::from(FontMetrics {
            height: 19.0,
            ascent: 15.0,
            descent: 4.0,
            natural_leading: 0.0,
        });
        assert_eq!(metrics.baseline, 15.0);
        assert_eq!(metrics.height, 19.0);
    }
}
