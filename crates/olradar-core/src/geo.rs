use olradar_types::GeoPoint;

/// Mean Earth radius used for all distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let x = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * x.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCKHOLM: GeoPoint = GeoPoint::new(59.334591, 18.063240);
    const MALMO: GeoPoint = GeoPoint::new(55.604981, 13.003822);

    #[test]
    fn same_point_is_zero() {
        assert_eq!(distance_km(STOCKHOLM, STOCKHOLM), 0.0);
    }

    #[test]
    fn symmetric() {
        assert_eq!(distance_km(STOCKHOLM, MALMO), distance_km(MALMO, STOCKHOLM));
    }

    #[test]
    fn stockholm_to_malmo() {
        let d = distance_km(STOCKHOLM, MALMO);
        assert!((d - 513.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }
}
