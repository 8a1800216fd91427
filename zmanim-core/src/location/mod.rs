//! Location resolution: postal code or coordinates to a `ResolvedLocation`.

mod postal;
mod zone;

pub use postal::{PostalCode, PostalTable};
pub use zone::{TzfZoneLookup, ZoneLookup, nautical_zone};

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{CUSTOM_LOCATION_NAME, SPECIAL_REGION_TZIDS};
use crate::error::{ZmanimError, ZmanimResult};

/// A location with everything the calendar engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub tz: Tz,
    /// Israel: one-day festivals and its own candle-lighting custom
    pub is_special_region: bool,
    pub display_name: String,
}

impl ResolvedLocation {
    pub fn tzid(&self) -> &'static str {
        self.tz.name()
    }
}

/// Raw location parameters as they arrive from the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    pub zip: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub tzid: Option<String>,
}

impl LocationQuery {
    pub fn zip(zip: impl Into<String>) -> Self {
        LocationQuery {
            zip: Some(zip.into()),
            ..Default::default()
        }
    }

    pub fn coordinates(lat: impl Into<String>, lng: impl Into<String>, tzid: Option<&str>) -> Self {
        LocationQuery {
            zip: None,
            lat: Some(lat.into()),
            lng: Some(lng.into()),
            tzid: tzid.map(str::to_string),
        }
    }
}

/// Resolves location queries using a postal table and a timezone finder.
pub struct LocationResolver {
    postal: PostalTable,
    zones: Box<dyn ZoneLookup + Send + Sync>,
}

impl LocationResolver {
    pub fn new(postal: PostalTable, zones: Box<dyn ZoneLookup + Send + Sync>) -> Self {
        LocationResolver { postal, zones }
    }

    /// Resolver backed by the bundled postal data and the tzf timezone finder.
    pub fn with_defaults() -> ZmanimResult<Self> {
        Ok(Self::new(PostalTable::bundled()?, Box::new(TzfZoneLookup::new())))
    }

    pub fn resolve(&self, query: &LocationQuery) -> ZmanimResult<ResolvedLocation> {
        let location = if let Some(zip) = non_empty(&query.zip) {
            self.resolve_zip(zip)?
        } else if let (Some(lat), Some(lng)) = (non_empty(&query.lat), non_empty(&query.lng)) {
            self.resolve_coordinates(lat, lng, non_empty(&query.tzid))?
        } else {
            return Err(ZmanimError::MissingLocation);
        };

        debug!(
            name = %location.display_name,
            tzid = location.tzid(),
            special_region = location.is_special_region,
            "Resolved location"
        );

        Ok(location)
    }

    fn resolve_zip(&self, zip: &str) -> ZmanimResult<ResolvedLocation> {
        let entry = self
            .postal
            .lookup(zip)
            .ok_or_else(|| ZmanimError::InvalidZip(zip.to_string()))?;

        let tz = self.zone_for(entry.latitude, entry.longitude);

        // Postal locations always follow diaspora rules, even military APO rows abroad
        Ok(ResolvedLocation {
            latitude: entry.latitude,
            longitude: entry.longitude,
            tz,
            is_special_region: false,
            display_name: format!("{}, {}, {}", entry.city, entry.state, entry.country),
        })
    }

    fn resolve_coordinates(
        &self,
        lat: &str,
        lng: &str,
        tzid: Option<&str>,
    ) -> ZmanimResult<ResolvedLocation> {
        let latitude = parse_degrees(lat, 90.0)?;
        let longitude = parse_degrees(lng, 180.0)?;

        let tz = match tzid {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ZmanimError::InvalidTimezone(name.to_string()))?,
            None => self.zone_for(latitude, longitude),
        };

        Ok(ResolvedLocation {
            latitude,
            longitude,
            tz,
            is_special_region: SPECIAL_REGION_TZIDS.contains(&tz.name()),
            display_name: CUSTOM_LOCATION_NAME.to_string(),
        })
    }

    fn zone_for(&self, latitude: f64, longitude: f64) -> Tz {
        self.zones
            .lookup(latitude, longitude)
            .unwrap_or_else(|| nautical_zone(longitude))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_degrees(value: &str, limit: f64) -> ZmanimResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| ZmanimError::InvalidCoordinates(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Fixed lookup so resolver tests don't depend on boundary data.
    struct FixedZones(HashMap<(i32, i32), Tz>);

    impl ZoneLookup for FixedZones {
        fn lookup(&self, latitude: f64, longitude: f64) -> Option<Tz> {
            self.0.get(&(latitude as i32, longitude as i32)).copied()
        }
    }

    fn resolver() -> LocationResolver {
        let zones = HashMap::from([
            ((40, -73), chrono_tz::America::New_York),
            ((31, 35), chrono_tz::Asia::Jerusalem),
            ((51, 0), chrono_tz::Europe::London),
            ((34, -118), chrono_tz::America::Los_Angeles),
        ]);
        LocationResolver::new(PostalTable::bundled().unwrap(), Box::new(FixedZones(zones)))
    }

    #[test]
    fn test_zip_resolves_to_us_location() {
        let location = resolver().resolve(&LocationQuery::zip("10001")).unwrap();

        assert_eq!(location.tzid(), "America/New_York");
        assert!(!location.is_special_region);
        assert_eq!(location.display_name, "New York, NY, US");
    }

    #[test]
    fn test_west_coast_zip() {
        let location = resolver().resolve(&LocationQuery::zip("90210")).unwrap();

        assert_eq!(location.tzid(), "America/Los_Angeles");
        assert_eq!(location.display_name, "Beverly Hills, CA, US");
    }

    #[test]
    fn test_zip_plus_four_uses_prefix() {
        let location = resolver().resolve(&LocationQuery::zip("10001-2062")).unwrap();
        assert_eq!(location.display_name, "New York, NY, US");
    }

    #[test]
    fn test_unknown_zip_is_invalid() {
        let err = resolver().resolve(&LocationQuery::zip("00000")).unwrap_err();
        assert!(matches!(err, ZmanimError::InvalidZip(_)));
        assert_eq!(err.to_string(), "Invalid zip code");
    }

    #[test]
    fn test_missing_location() {
        let err = resolver().resolve(&LocationQuery::default()).unwrap_err();
        assert!(matches!(err, ZmanimError::MissingLocation));

        // lat without lng is not a complete shape
        let query = LocationQuery {
            lat: Some("40.7".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolver().resolve(&query).unwrap_err(),
            ZmanimError::MissingLocation
        ));
    }

    #[test]
    fn test_empty_zip_falls_through_to_coordinates() {
        let query = LocationQuery {
            zip: Some(String::new()),
            ..LocationQuery::coordinates("51.5074", "-0.1278", None)
        };
        let location = resolver().resolve(&query).unwrap();
        assert_eq!(location.tzid(), "Europe/London");
        assert_eq!(location.display_name, "Custom Location");
    }

    #[test]
    fn test_jerusalem_coordinates_are_special_region() {
        let query = LocationQuery::coordinates("31.7683", "35.2137", None);
        let location = resolver().resolve(&query).unwrap();

        assert_eq!(location.tzid(), "Asia/Jerusalem");
        assert!(location.is_special_region);
    }

    #[test]
    fn test_client_tzid_wins_over_lookup() {
        let query = LocationQuery::coordinates("31.7683", "35.2137", Some("Asia/Tel_Aviv"));
        let location = resolver().resolve(&query).unwrap();
        assert_eq!(location.tzid(), "Asia/Tel_Aviv");
        assert!(location.is_special_region);

        let query = LocationQuery::coordinates("40.7128", "-74.0060", Some("America/Chicago"));
        let location = resolver().resolve(&query).unwrap();
        assert_eq!(location.tzid(), "America/Chicago");
        assert!(!location.is_special_region);
    }

    #[test]
    fn test_empty_tzid_is_ignored() {
        let query = LocationQuery::coordinates("40.7128", "-73.5", Some(""));
        let location = resolver().resolve(&query).unwrap();
        assert_eq!(location.tzid(), "America/New_York");
    }

    #[test]
    fn test_unknown_tzid_is_rejected() {
        let query = LocationQuery::coordinates("40.7128", "-74.0060", Some("Mars/Olympus"));
        assert!(matches!(
            resolver().resolve(&query).unwrap_err(),
            ZmanimError::InvalidTimezone(_)
        ));
    }

    #[test]
    fn test_bad_coordinates_are_rejected() {
        for (lat, lng) in [("abc", "10"), ("95", "10"), ("10", "181"), ("NaN", "0")] {
            let query = LocationQuery::coordinates(lat, lng, None);
            assert!(
                matches!(
                    resolver().resolve(&query).unwrap_err(),
                    ZmanimError::InvalidCoordinates(_)
                ),
                "{lat},{lng} should be rejected"
            );
        }
    }

    #[test]
    fn test_ocean_coordinates_fall_back_to_nautical_zone() {
        let query = LocationQuery::coordinates("0", "-150", None);
        let location = resolver().resolve(&query).unwrap();
        assert_eq!(location.tzid(), "Etc/GMT+10");
        assert!(!location.is_special_region);
    }
}
