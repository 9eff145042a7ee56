//! Great-circle distance on a spherical earth.

/// Mean earth radius (IUGG) in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometers per international nautical mile.
pub const KM_PER_NM: f64 = 1.852;

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = EARTH_RADIUS_KM / KM_PER_NM;

/// Haversine distance between two positions, in nautical miles.
///
/// Read more here: https://en.wikipedia.org/wiki/Haversine_formula
///
/// ```
/// use circle_crossing::geodesic::distance_nm;
///
/// // one minute of latitude is very nearly one nautical mile
/// let d = distance_nm(66.0, 12.0, 66.0 + 1.0 / 60.0, 12.0);
/// assert!((d - 1.0).abs() < 0.01);
/// ```
#[inline]
pub fn distance_nm(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let lat1 = lat_a.to_radians();
    let lat2 = lat_b.to_radians();
    let d_lat = (lat_b - lat_a).to_radians();
    let d_lon = (lon_b - lon_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // clamp: rounding can push `a` a hair past 1 for antipodal points
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_NM * c
}
