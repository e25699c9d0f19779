//! Density-independent pixel conversion.

/// Baseline density: one dp is one px at 160 dpi.
pub const DEFAULT_DENSITY_DPI: f32 = 160.0;

/// Convert density-independent pixels to physical pixels.
pub fn dp_to_px(dp: f32, density_dpi: f32) -> f32 {
    dp * (density_dpi / DEFAULT_DENSITY_DPI)
}

/// Scale a CSS pixel coordinate reported by the page to device pixels.
///
/// The coordinate is truncated to whole CSS pixels first, then the scaled
/// value is truncated toward zero.
pub fn scale_to_device(value: f64, density: f32) -> i32 {
    (value as i32 as f32 * density) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp_to_px() {
        assert_eq!(dp_to_px(20.0, 160.0), 20.0);
        assert_eq!(dp_to_px(20.0, 480.0), 60.0);
        assert_eq!(dp_to_px(10.0, 240.0), 15.0);
    }

    #[test]
    fn test_scale_truncates() {
        assert_eq!(scale_to_device(10.9, 1.0), 10);
        assert_eq!(scale_to_device(10.5, 2.0), 20);
        assert_eq!(scale_to_device(10.7, 1.5), 15);
        assert_eq!(scale_to_device(-3.5, 2.0), -6);
        assert_eq!(scale_to_device(33.3, 3.0), 99);
    }
}
