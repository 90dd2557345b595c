//! Screen DPI from monitor geometry

use crate::platform::MonitorInfo;

/// DPI assumed when the monitor does not report a physical size
pub const DEFAULT_DPI: f64 = 72.0;

const MM_PER_INCH: f64 = 25.4;

/// Native DPI of a `pixels` resolution spread over `millimetres`
///
/// Geometric mean of the horizontal and vertical densities, so non-square
/// pixels still give one number. `None` when either physical dimension is
/// unknown (reported as zero).
pub fn native_dpi(pixels: (u32, u32), millimetres: (i32, i32)) -> Option<f64> {
    let (width_mm, height_mm) = millimetres;
    if width_mm <= 0 || height_mm <= 0 {
        return None;
    }
    let area_px = f64::from(pixels.0) * f64::from(pixels.1);
    let area_in = (f64::from(width_mm) / MM_PER_INCH) * (f64::from(height_mm) / MM_PER_INCH);
    Some((area_px / area_in).sqrt())
}

/// Effective DPI of a monitor: native density times its horizontal content scale
pub fn monitor_dpi(monitor: &MonitorInfo) -> f64 {
    let scale = f64::from(monitor.content_scale.0);
    let mode = &monitor.video_mode;
    native_dpi((mode.width, mode.height), monitor.physical_size_mm).unwrap_or(DEFAULT_DPI) * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::VideoMode;
    use approx::assert_relative_eq;

    fn monitor(pixels: (u32, u32), mm: (i32, i32), scale: f32) -> MonitorInfo {
        MonitorInfo {
            name: None,
            video_mode: VideoMode {
                width: pixels.0,
                height: pixels.1,
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                refresh_rate: 60,
            },
            physical_size_mm: mm,
            content_scale: (scale, scale),
        }
    }

    #[test]
    fn test_square_pixels() {
        // 254mm across 1000px is exactly 100 DPI in both directions.
        assert_relative_eq!(native_dpi((1000, 500), (254, 127)).unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_physical_size() {
        assert_eq!(native_dpi((1920, 1080), (0, 0)), None);
        assert_relative_eq!(monitor_dpi(&monitor((1920, 1080), (0, 0), 2.0)), 144.0);
    }

    #[test]
    fn test_content_scale_multiplies() {
        let base = monitor_dpi(&monitor((1000, 500), (254, 127), 1.0));
        let scaled = monitor_dpi(&monitor((1000, 500), (254, 127), 1.5));
        assert_relative_eq!(scaled, base * 1.5, epsilon = 1e-9);
    }
}
