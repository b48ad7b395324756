//! Static reference data: state/territory codes, per-state longitude bounds
//! and the accepted access technologies.
//!
//! All tables are immutable for the process lifetime.

/// Valid state and territory codes, in reporting order.
pub const VALID_STATES: [&str; 56] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP",
];

/// Accepted values of the `technology` column (matched case-insensitively).
pub const VALID_TECHNOLOGIES: [&str; 6] = [
    "fiber",
    "cable",
    "dsl",
    "wireless_licensed",
    "wireless_unlicensed",
    "copper",
];

/// Territories west of the antimeridian whose longitudes are positive.
pub const EASTERN_HEMISPHERE_STATES: [&str; 2] = ["GU", "MP"];

/// Longitude bounding box of a state or territory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonRange {
    pub min: f64,
    pub max: f64,
}

impl LonRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive containment. `NaN` is never contained.
    pub fn contains(&self, lon: f64) -> bool {
        self.min <= lon && lon <= self.max
    }
}

const STATE_LON_RANGES: [(&str, LonRange); 56] = [
    ("AL", LonRange::new(-88.473227, -84.889080)),
    ("AK", LonRange::new(-179.148909, 179.778470)),
    ("AZ", LonRange::new(-114.816510, -109.045223)),
    ("AR", LonRange::new(-94.617919, -89.644395)),
    ("CA", LonRange::new(-124.409591, -114.131211)),
    ("CO", LonRange::new(-109.060253, -102.041524)),
    ("CT", LonRange::new(-73.727775, -71.786994)),
    ("DE", LonRange::new(-75.788658, -75.048939)),
    ("FL", LonRange::new(-87.634896, -80.031056)),
    ("GA", LonRange::new(-85.605165, -80.840141)),
    ("HI", LonRange::new(-178.334698, -154.806773)),
    ("ID", LonRange::new(-117.243027, -111.043564)),
    ("IL", LonRange::new(-91.513079, -87.494756)),
    ("IN", LonRange::new(-88.097892, -84.787981)),
    ("IA", LonRange::new(-96.639704, -90.140061)),
    ("KS", LonRange::new(-102.051744, -94.588413)),
    ("KY", LonRange::new(-89.571510, -81.964971)),
    ("LA", LonRange::new(-94.043147, -88.817017)),
    ("ME", LonRange::new(-71.083924, -66.949895)),
    ("MD", LonRange::new(-79.487651, -75.048939)),
    ("MA", LonRange::new(-73.508142, -69.928393)),
    ("MI", LonRange::new(-90.418136, -82.413474)),
    ("MN", LonRange::new(-97.239209, -89.483385)),
    ("MS", LonRange::new(-91.655009, -88.097892)),
    ("MO", LonRange::new(-95.774704, -89.098843)),
    ("MT", LonRange::new(-116.050002, -104.039138)),
    ("NE", LonRange::new(-104.053514, -95.308290)),
    ("NV", LonRange::new(-120.005746, -114.039648)),
    ("NH", LonRange::new(-72.557247, -70.610621)),
    ("NJ", LonRange::new(-75.559614, -73.893979)),
    ("NM", LonRange::new(-109.050173, -103.001964)),
    ("NY", LonRange::new(-79.762152, -71.856214)),
    ("NC", LonRange::new(-84.321869, -75.460621)),
    ("ND", LonRange::new(-104.048900, -96.554507)),
    ("OH", LonRange::new(-84.820159, -80.518693)),
    ("OK", LonRange::new(-103.002455, -94.430662)),
    ("OR", LonRange::new(-124.566244, -116.463262)),
    ("PA", LonRange::new(-80.519891, -74.689516)),
    ("RI", LonRange::new(-71.886819, -71.120557)),
    ("SC", LonRange::new(-83.353910, -78.541138)),
    ("SD", LonRange::new(-104.057698, -96.436589)),
    ("TN", LonRange::new(-90.310298, -81.646900)),
    ("TX", LonRange::new(-106.645646, -93.508292)),
    ("UT", LonRange::new(-114.052998, -109.041058)),
    ("VT", LonRange::new(-73.437740, -71.464555)),
    ("VA", LonRange::new(-83.675395, -75.242266)),
    ("WA", LonRange::new(-124.763068, -116.915989)),
    ("WV", LonRange::new(-82.644739, -77.719519)),
    ("WI", LonRange::new(-92.889433, -86.763983)),
    ("WY", LonRange::new(-111.056888, -104.052160)),
    ("DC", LonRange::new(-77.119759, -76.909393)),
    ("PR", LonRange::new(-67.945404, -65.220703)),
    ("VI", LonRange::new(-65.013029, -64.564907)),
    ("GU", LonRange::new(144.618068, 144.956706)),
    ("AS", LonRange::new(-170.841600, -169.406622)),
    ("MP", LonRange::new(145.128345, 145.853700)),
];

/// Longitude bounds for an upper-case state code.
pub fn lon_range(state: &str) -> Option<LonRange> {
    STATE_LON_RANGES
        .iter()
        .find(|(code, _)| *code == state)
        .map(|(_, range)| *range)
}

/// Whether longitudes in this state must be negative.
pub fn requires_negative_lon(state: &str) -> bool {
    !EASTERN_HEMISPHERE_STATES.contains(&state)
}

/// Case-insensitive state code check.
pub fn is_valid_state(value: &str) -> bool {
    VALID_STATES.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// Case-insensitive technology check.
pub fn is_valid_technology(value: &str) -> bool {
    VALID_TECHNOLOGIES.iter().any(|t| t.eq_ignore_ascii_case(value))
}

/// Render a list the way the report messages quote it: `['a', 'b']`.
pub fn quoted_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
    format!("[{}]", quoted.join(", "))
}
