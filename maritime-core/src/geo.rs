//! Great-circle helpers shared by the simulator and the analytics.
//!
//! Distances are always nautical miles, angles are degrees measured clockwise
//! from true north.

use geoutils::Location;

use crate::Coordinates;

pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Mean earth radius used when projecting positions.
const EARTH_RADIUS_NAUTICAL_MILES: f64 = 6_371_008.8 / METERS_PER_NAUTICAL_MILE;

/// Haversine distance between two positions.
///
/// Every distance in the system goes through this function so that vessel
/// summaries and windowed statistics agree exactly.
pub fn distance_nm(from: &Coordinates, to: &Coordinates) -> f64 {
    let from = Location::new(from.latitude, from.longitude);
    let to = Location::new(to.latitude, to.longitude);

    from.haversine_distance_to(&to).meters() / METERS_PER_NAUTICAL_MILE
}

/// Sum of the distances between consecutive positions.
pub fn path_length_nm<'a, I>(positions: I) -> f64
where
    I: IntoIterator<Item = &'a Coordinates>,
{
    let mut iter = positions.into_iter();
    let Some(mut prev) = iter.next() else {
        return 0.0;
    };

    let mut total = 0.0;
    for next in iter {
        total += distance_nm(prev, next);
        prev = next;
    }
    total
}

/// Initial great-circle bearing from `from` towards `to`, in `[0, 360)`.
pub fn initial_bearing(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Position reached after travelling `distance_nm` along the great circle
/// starting at `from` with initial bearing `bearing`.
pub fn destination(from: &Coordinates, bearing: f64, distance_nm: f64) -> Coordinates {
    if distance_nm <= 0.0 {
        return *from;
    }

    let angular = distance_nm / EARTH_RADIUS_NAUTICAL_MILES;
    let bearing = bearing.to_radians();
    let lat1 = from.latitude.to_radians();
    let lon1 = from.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinates::new(
        lat2.to_degrees().clamp(-90.0, 90.0),
        normalize_longitude(lon2.to_degrees()),
    )
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (-90.0..=90.0).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (-180.0..=180.0).contains(&longitude)
}

pub fn is_valid_position(latitude: f64, longitude: f64) -> bool {
    is_valid_latitude(latitude) && is_valid_longitude(longitude)
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(value: f64) -> f64 {
    let v = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if v >= 360.0 { 0.0 } else { v }
}

/// Wraps a longitude into `[-180, 180]`.
pub fn normalize_longitude(value: f64) -> f64 {
    let v = (value + 180.0).rem_euclid(360.0) - 180.0;
    if v < -180.0 { v + 360.0 } else { v }
}

/// Mean of compass angles computed on the unit circle, so that 359 and 1
/// average to 0 rather than 180. Returns `None` for an empty input or when
/// the angles cancel out.
pub fn circular_mean_degrees<I>(angles: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sin, cos, count) = angles
        .into_iter()
        .fold((0.0, 0.0, 0usize), |(sin, cos, count), angle| {
            let rad = angle.to_radians();
            (sin + rad.sin(), cos + rad.cos(), count + 1)
        });

    if count == 0 || (sin.abs() < 1e-12 && cos.abs() < 1e-12) {
        return None;
    }

    Some(normalize_degrees(sin.atan2(cos).to_degrees()))
}
