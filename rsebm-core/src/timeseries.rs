//! Scalar aliases and time conversions shared by the whole workspace.
//!
//! Simulation time is always measured in seconds.
//! Helpers are provided to move between seconds and the day/year units that
//! are more natural for describing multi-millennial runs.

pub type FloatValue = f64;

/// Simulation time in seconds
pub type Time = f64;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: Time = 86_400.0;

/// Number of seconds in a Julian year (365.25 days)
pub const SECONDS_PER_YEAR: Time = 31_557_600.0;

pub fn days_to_seconds(days: FloatValue) -> Time {
    days * SECONDS_PER_DAY
}

pub fn years_to_seconds(years: FloatValue) -> Time {
    years * SECONDS_PER_YEAR
}

pub fn seconds_to_years(seconds: Time) -> FloatValue {
    seconds / SECONDS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn julian_year() {
        assert_eq!(SECONDS_PER_YEAR, 365.25 * SECONDS_PER_DAY);
        assert_eq!(years_to_seconds(4000.0), 126_230_400_000.0);
        assert_eq!(seconds_to_years(years_to_seconds(12.5)), 12.5);
    }

    #[test]
    fn max_step_in_seconds() {
        assert_eq!(days_to_seconds(276.0), 23_846_400.0);
    }
}
