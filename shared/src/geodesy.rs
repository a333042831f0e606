//! Nearest-station resolution over the WGS84 ellipsoid

use geo::{GeodesicDistance, Point};

use crate::models::WeatherStation;
use crate::types::{round2, GpsCoordinates};

/// Geodesic distance between two coordinates in kilometres
pub fn geodesic_km(from: GpsCoordinates, to: GpsCoordinates) -> f64 {
    let a = Point::new(from.longitude, from.latitude);
    let b = Point::new(to.longitude, to.latitude);
    a.geodesic_distance(&b) / 1000.0
}

/// Station closest to a point
#[derive(Debug, Clone, PartialEq)]
pub struct StationMatch<'a> {
    pub station: &'a WeatherStation,
    /// Distance rounded to two decimals
    pub distance_km: f64,
}

/// Find the station with the smallest geodesic distance to `point`.
///
/// Every station is measured (no spatial index). On equal distances the
/// station listed first wins. Returns `None` for an empty station list or
/// when no distance is a finite number.
pub fn nearest_station(point: GpsCoordinates, stations: &[WeatherStation]) -> Option<StationMatch<'_>> {
    let mut best: Option<(&WeatherStation, f64)> = None;

    for station in stations {
        let distance = geodesic_km(point, station.coordinates());
        if !distance.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((station, distance));
        }
    }

    best.map(|(station, distance)| StationMatch {
        station,
        distance_km: round2(distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn station(name: &str, lat: f64, lon: f64) -> WeatherStation {
        WeatherStation {
            location_name: name.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_nearest_station_example() {
        let stations = vec![station("A", 3.0, 101.0), station("B", 3.5, 101.5)];
        let found = nearest_station(GpsCoordinates::new(3.1, 101.05), &stations).unwrap();
        assert_eq!(found.station.location_name, "A");
    }

    #[test]
    fn test_distance_is_rounded_reference_value() {
        // One degree of latitude at the equator on WGS84 is 110.574 km
        let stations = vec![station("North", 1.0, 101.0)];
        let found = nearest_station(GpsCoordinates::new(0.0, 101.0), &stations).unwrap();
        assert_eq!(found.distance_km, 110.57);
    }

    #[test]
    fn test_tie_goes_to_first_station() {
        let stations = vec![station("East", 3.0, 101.1), station("West", 3.0, 100.9)];
        let found = nearest_station(GpsCoordinates::new(3.0, 101.0), &stations).unwrap();
        assert_eq!(found.station.location_name, "East");
    }

    #[test]
    fn test_empty_station_list() {
        assert!(nearest_station(GpsCoordinates::new(3.0, 101.0), &[]).is_none());
    }

    #[test]
    fn test_same_point_is_zero_distance() {
        let stations = vec![station("Here", 2.5, 102.5)];
        let found = nearest_station(GpsCoordinates::new(2.5, 102.5), &stations).unwrap();
        assert_eq!(found.distance_km, 0.0);
    }

    fn malaysia_point() -> impl Strategy<Value = (f64, f64)> {
        (1.0f64..7.0, 99.5f64..119.5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The chosen station is never farther than any other station
        #[test]
        fn prop_nearest_is_argmin(
            point in malaysia_point(),
            raw in prop::collection::vec(malaysia_point(), 1..20)
        ) {
            let stations: Vec<WeatherStation> = raw
                .iter()
                .enumerate()
                .map(|(i, (lat, lon))| station(&format!("S{}", i), *lat, *lon))
                .collect();
            let origin = GpsCoordinates::new(point.0, point.1);

            let found = nearest_station(origin, &stations).unwrap();
            let chosen = geodesic_km(origin, found.station.coordinates());
            for s in &stations {
                prop_assert!(chosen <= geodesic_km(origin, s.coordinates()));
            }
            prop_assert!((found.distance_km - round2(chosen)).abs() < 1e-9);
        }
    }
}
