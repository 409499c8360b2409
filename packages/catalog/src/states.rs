//! State and territory FIPS code tables.
//!
//! Extends the usual 50-states-plus-DC table with the five inhabited
//! territories TIGER/Line also publishes, since the spec's `STATES` mapping
//! and `FIFTY_STATE_FIPS`/territory split need both.

/// FIPS codes for the 50 US states plus the District of Columbia.
pub const FIFTY_STATE_FIPS: &[&str] = &[
    "01", "02", "04", "05", "06", "08", "09", "10", "11", "12", "13", "15", "16", "17", "18", "19",
    "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32", "33", "34", "35",
    "36", "37", "38", "39", "40", "41", "42", "44", "45", "46", "47", "48", "49", "50", "51", "53",
    "54", "55", "56",
];

/// FIPS codes for the inhabited territories TIGER/Line publishes alongside
/// the states.
pub const TERRITORY_FIPS: &[&str] = &["60", "66", "69", "72", "78"];

/// All state and territory FIPS codes this catalog knows a name for.
#[must_use]
pub fn all_fips() -> Vec<&'static str> {
    FIFTY_STATE_FIPS
        .iter()
        .chain(TERRITORY_FIPS.iter())
        .copied()
        .collect()
}

/// Maps a FIPS code (state or territory) to its full name.
///
/// Returns `"Unknown"` for unrecognized codes.
#[must_use]
pub const fn state_name(fips: &str) -> &'static str {
    match fips.as_bytes() {
        b"01" => "Alabama",
        b"02" => "Alaska",
        b"04" => "Arizona",
        b"05" => "Arkansas",
        b"06" => "California",
        b"08" => "Colorado",
        b"09" => "Connecticut",
        b"10" => "Delaware",
        b"11" => "District of Columbia",
        b"12" => "Florida",
        b"13" => "Georgia",
        b"15" => "Hawaii",
        b"16" => "Idaho",
        b"17" => "Illinois",
        b"18" => "Indiana",
        b"19" => "Iowa",
        b"20" => "Kansas",
        b"21" => "Kentucky",
        b"22" => "Louisiana",
        b"23" => "Maine",
        b"24" => "Maryland",
        b"25" => "Massachusetts",
        b"26" => "Michigan",
        b"27" => "Minnesota",
        b"28" => "Mississippi",
        b"29" => "Missouri",
        b"30" => "Montana",
        b"31" => "Nebraska",
        b"32" => "Nevada",
        b"33" => "New Hampshire",
        b"34" => "New Jersey",
        b"35" => "New Mexico",
        b"36" => "New York",
        b"37" => "North Carolina",
        b"38" => "North Dakota",
        b"39" => "Ohio",
        b"40" => "Oklahoma",
        b"41" => "Oregon",
        b"42" => "Pennsylvania",
        b"44" => "Rhode Island",
        b"45" => "South Carolina",
        b"46" => "South Dakota",
        b"47" => "Tennessee",
        b"48" => "Texas",
        b"49" => "Utah",
        b"50" => "Vermont",
        b"51" => "Virginia",
        b"53" => "Washington",
        b"54" => "West Virginia",
        b"55" => "Wisconsin",
        b"56" => "Wyoming",
        b"60" => "American Samoa",
        b"66" => "Guam",
        b"69" => "Commonwealth of the Northern Mariana Islands",
        b"72" => "Puerto Rico",
        b"78" => "United States Virgin Islands",
        _ => "Unknown",
    }
}

/// Whether `fips` names one of the 50 states (or DC), as opposed to a
/// territory.
#[must_use]
pub fn is_fifty_state(fips: &str) -> bool {
    FIFTY_STATE_FIPS.contains(&fips)
}

/// Whether `fips` names one of the inhabited territories.
#[must_use]
pub fn is_territory(fips: &str) -> bool {
    TERRITORY_FIPS.contains(&fips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_state_count() {
        assert_eq!(FIFTY_STATE_FIPS.len(), 51);
    }

    #[test]
    fn territory_count() {
        assert_eq!(TERRITORY_FIPS.len(), 5);
    }

    #[test]
    fn states_and_territories_are_disjoint() {
        for fips in FIFTY_STATE_FIPS {
            assert!(!is_territory(fips));
        }
        for fips in TERRITORY_FIPS {
            assert!(!is_fifty_state(fips));
        }
    }

    #[test]
    fn name_coverage() {
        for fips in all_fips() {
            assert_ne!(state_name(fips), "Unknown", "no name for FIPS: {fips}");
        }
    }

    #[test]
    fn unknown_fips_name() {
        assert_eq!(state_name("99"), "Unknown");
    }
}
