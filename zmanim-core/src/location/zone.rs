//! Coordinate to IANA timezone lookup.

use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

/// Finds the timezone in effect at a coordinate.
pub trait ZoneLookup {
    /// `None` when the coordinate has no land timezone.
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<Tz>;
}

/// Offline lookup against the timezone boundary data bundled in `tzf-rs`.
pub struct TzfZoneLookup {
    finder: DefaultFinder,
}

impl TzfZoneLookup {
    pub fn new() -> Self {
        TzfZoneLookup {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfZoneLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneLookup for TzfZoneLookup {
    fn lookup(&self, latitude: f64, longitude: f64) -> Option<Tz> {
        let name = self.finder.get_tz_name(longitude, latitude);
        if name.is_empty() {
            return None;
        }
        name.parse().ok()
    }
}

/// Fixed-offset `Etc/GMT` zone for a longitude (note the inverted POSIX sign).
pub fn nautical_zone(longitude: f64) -> Tz {
    let hours = (longitude / 15.0).round().clamp(-12.0, 12.0) as i32;
    let name = match hours {
        0 => "Etc/GMT".to_string(),
        h if h > 0 => format!("Etc/GMT-{h}"),
        h => format!("Etc/GMT+{}", -h),
    };
    name.parse().unwrap_or(Tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nautical_zone_signs() {
        assert_eq!(nautical_zone(0.0).name(), "Etc/GMT");
        assert_eq!(nautical_zone(35.0).name(), "Etc/GMT-2");
        assert_eq!(nautical_zone(-74.0).name(), "Etc/GMT+5");
        assert_eq!(nautical_zone(179.9).name(), "Etc/GMT-12");
    }

    #[test]
    fn test_tzf_lookup_known_cities() {
        let zones = TzfZoneLookup::new();

        assert_eq!(zones.lookup(31.7683, 35.2137), Some(chrono_tz::Asia::Jerusalem));
        assert_eq!(zones.lookup(40.7506, -73.9972), Some(chrono_tz::America::New_York));
        assert_eq!(zones.lookup(41.8781, -87.6298), Some(chrono_tz::America::Chicago));
    }
}
