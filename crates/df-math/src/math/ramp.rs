//! Linear anticipation ramp.

/// Ramp value of timestamp `t` against an occurrence at `occurrence`.
///
/// Defined only on `[occurrence - window, occurrence]`, where it rises
/// linearly from 0 to 1: `1 - (occurrence - t) / window`. The distance is
/// taken in integers first, so the occurrence itself is exactly 1.0 and no
/// value leaves `[0, 1]`. Outside that interval there is no contribution and
/// `None` is returned.
pub fn ramp_value(t: i64, occurrence: i64, window: f64) -> Option<f64> {
    let distance = i128::from(occurrence) - i128::from(t);
    if distance < 0 {
        return None;
    }
    let distance = distance as f64;
    if distance <= window {
        Some(1.0 - distance / window)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_at_occurrence() {
        assert_eq!(ramp_value(100, 100, 30.0), Some(1.0));
    }

    #[test]
    fn zero_at_window_start() {
        assert_eq!(ramp_value(70, 100, 30.0), Some(0.0));
    }

    #[test]
    fn linear_inside_window() {
        let v = ramp_value(85, 100, 30.0).unwrap();
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nothing_outside_window() {
        assert_eq!(ramp_value(69, 100, 30.0), None);
        assert_eq!(ramp_value(101, 100, 30.0), None);
    }

    #[test]
    fn exact_peak_with_inexact_window() {
        for window in [0.3, 1.1, 14.409770895554368] {
            assert_eq!(ramp_value(31, 31, window), Some(1.0), "window {window}");
        }
        assert_eq!(ramp_value(i64::MAX, i64::MAX, 0.1), Some(1.0));
    }

    #[test]
    fn stays_in_unit_interval() {
        for window in [0.3, 1.1, 2.5, 14.409770895554368, 30.0] {
            for t in 0..=40 {
                if let Some(v) = ramp_value(t, 40, window) {
                    assert!((0.0..=1.0).contains(&v), "t {t} window {window}: {v}");
                }
            }
        }
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        assert_eq!(ramp_value(i64::MIN, i64::MAX, 1e3), None);
        assert_eq!(ramp_value(i64::MIN, i64::MAX, 1e300), Some(1.0));
    }

    #[test]
    fn fractional_window() {
        let v = ramp_value(9, 10, 2.5).unwrap();
        assert!((v - 0.6).abs() < 1e-12);
    }
}
