use olradar_types::GeoPoint;

/// Centres of the cities the app knows about.
pub const CITY_CENTERS: &[(&str, GeoPoint)] = &[
    ("Helsingborg", GeoPoint::new(56.0467, 12.6944)),
    ("Stockholm", GeoPoint::new(59.334591, 18.063240)),
    ("Göteborg", GeoPoint::new(57.708870, 11.974560)),
    ("Malmö", GeoPoint::new(55.604981, 13.003822)),
];

pub const DEFAULT_CITY: &str = "Stockholm";

pub fn city_center(name: &str) -> Option<GeoPoint> {
    let name = name.trim().to_lowercase();
    CITY_CENTERS
        .iter()
        .find(|(city, _)| city.to_lowercase() == name)
        .map(|&(_, point)| point)
}
