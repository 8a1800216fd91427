/// Days of history included before "now" in every feed.
pub const WINDOW_PAST_DAYS: i64 = 5;

/// Months of future included after "now" in every feed.
pub const WINDOW_FUTURE_MONTHS: u32 = 12;

/// Default minutes before sunset for candle-lighting.
pub const DEFAULT_CANDLE_LIGHTING_MINS: i64 = 18;

/// Candle-lighting minutes used for locations in the special region (Israel).
pub const SPECIAL_REGION_CANDLE_LIGHTING_MINS: i64 = 40;

/// Timezones that mark a coordinate location as being in the special region.
pub const SPECIAL_REGION_TZIDS: [&str; 2] = ["Asia/Jerusalem", "Asia/Tel_Aviv"];

/// Display name used for coordinate-based locations.
pub const CUSTOM_LOCATION_NAME: &str = "Custom Location";

/// Prefix of every feed's calendar name.
pub const FEED_NAME_PREFIX: &str = "Zmanim Feed";
