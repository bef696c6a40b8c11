//! Coordinate normalization for cache keys.
//!
//! Nearby requests should land on the same key, so raw coordinates are
//! rounded to a configurable number of decimal digits before the key is
//! built. The precision loss is intentional: it trades geographic
//! resolution for cache density.

/// Rounds both coordinates to `decimals` digits, half away from zero.
///
/// Idempotent: feeding an already-rounded pair back in is a no-op.
///
/// Longitudes +180 and -180 name the same meridian but are not collapsed
/// to one representation here, so they occupy distinct cache partitions.
pub fn rounded_coords(lat: f64, lon: f64, decimals: u32) -> (f64, f64) {
    let scale = 10f64.powi(decimals as i32);
    ((lat * scale).round() / scale, (lon * scale).round() / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn rounds_to_requested_precision() {
        let (rlat, rlon) = rounded_coords(51.5074, -0.1278, 2);
        assert_approx_eq!(rlat, 51.51);
        assert_approx_eq!(rlon, -0.13);
    }

    #[test]
    fn is_idempotent() {
        let first = rounded_coords(48.85661, 2.35222, 2);
        let second = rounded_coords(first.0, first.1, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn groups_pairs_within_rounding_resolution() {
        // Two points ~200m apart share a key at 2 decimals.
        let a = rounded_coords(51.5074, -0.1278, 2);
        let b = rounded_coords(51.5091, -0.1312, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn antimeridian_representations_stay_distinct() {
        let east = rounded_coords(0.0, 180.0, 2);
        let west = rounded_coords(0.0, -180.0, 2);
        assert_ne!(east.1, west.1);
    }

    #[test]
    fn zero_decimals_rounds_to_whole_degrees() {
        let (rlat, rlon) = rounded_coords(51.5074, -0.1278, 0);
        assert_approx_eq!(rlat, 52.0);
        assert_approx_eq!(rlon, -0.0);
    }
}
