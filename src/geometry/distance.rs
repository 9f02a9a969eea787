/// Mean spherical Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two (lat, lon) points in degrees
pub fn great_circle_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_distance() {
        assert_eq!(great_circle_distance((45.0, -122.0), (45.0, -122.0)), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // 2 * pi * 6371 / 360
        let d = great_circle_distance((0.0, 0.0), (1.0, 0.0));
        assert_relative_eq!(d, 111.19492664455873, epsilon = 1e-9);
    }

    #[test]
    fn test_monotonic_along_meridian() {
        let mut previous = 0.0;
        for step in 1..=180 {
            let lat = step as f64 * 0.5;
            let d = great_circle_distance((0.0, 0.0), (lat, 0.0));
            assert!(d > previous, "distance must grow with angular separation");
            previous = d;
        }
    }

    #[test]
    fn test_symmetric() {
        let portland = (45.5152, -122.6784);
        let salem = (44.9429, -123.0351);
        assert_relative_eq!(
            great_circle_distance(portland, salem),
            great_circle_distance(salem, portland)
        );
        let d = great_circle_distance(portland, salem);
        assert!((d - 70.0).abs() < 5.0);
    }

    #[test]
    fn test_antipodal() {
        let d = great_circle_distance((0.0, 0.0), (0.0, 180.0));
        assert_relative_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }
}
