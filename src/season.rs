//! Season label <-> end-year conversion.
//!
//! The provider keys every snapshot by the calendar year a season ends in, so
//! "2023-24" is stored and fetched as `2024`.

use crate::error::{Error, Result};

/// First season the provider carries player data for.
pub const FIRST_YEAR: i32 = 2009;
/// Most recent season refreshed by default.
pub const LATEST_YEAR: i32 = 2025;

pub fn season_to_year(season: &str) -> Result<i32> {
    let invalid = || Error::InvalidFormat {
        input: season.to_string(),
    };
    let (start, _) = season.trim().split_once('-').ok_or_else(invalid)?;
    let start = start.parse::<i32>().map_err(|_| invalid())?;
    start.checked_add(1).ok_or_else(invalid)
}

pub fn year_to_season(year: i32) -> String {
    format!("{}-{:02}", year - 1, year.rem_euclid(100))
}

/// All end years profiles are assembled from, oldest first.
pub fn profile_years() -> Vec<i32> {
    (FIRST_YEAR..=LATEST_YEAR).collect()
}

/// Expands the refresh job's `--seasons` values: none means every default
/// year, one value is a single year, two values an inclusive range, and
/// anything longer an explicit list.
pub fn expand_years(values: &[i32]) -> Vec<i32> {
    match values {
        [] => profile_years(),
        [single] => vec![*single],
        [start, end] => (*start..=*end).collect(),
        list => list.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_label_maps_to_end_year() {
        assert_eq!(season_to_year("2023-24").unwrap(), 2024);
        assert_eq!(season_to_year("1999-00").unwrap(), 2000);
    }

    #[test]
    fn end_year_formats_as_label() {
        assert_eq!(year_to_season(2024), "2023-24");
        assert_eq!(year_to_season(2000), "1999-00");
        assert_eq!(year_to_season(2010), "2009-10");
    }

    #[test]
    fn malformed_labels_are_rejected() {
        for bad in ["2024", "abcd-24", "", "-24", "20x3-24"] {
            let err = season_to_year(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidFormat { .. }),
                "{bad} should be InvalidFormat"
            );
        }
    }

    #[test]
    fn conversions_are_inverse() {
        for year in [1000, 1901, 2000, 2009, 2024, 2099, 9999] {
            let label = year_to_season(year);
            assert_eq!(season_to_year(&label).unwrap(), year);
            assert_eq!(year_to_season(season_to_year(&label).unwrap()), label);
        }
    }

    #[test]
    fn expand_years_follows_arity() {
        assert_eq!(expand_years(&[]).first(), Some(&FIRST_YEAR));
        assert_eq!(expand_years(&[]).last(), Some(&LATEST_YEAR));
        assert_eq!(expand_years(&[2024]), vec![2024]);
        assert_eq!(expand_years(&[2022, 2025]), vec![2022, 2023, 2024, 2025]);
        assert_eq!(expand_years(&[2019, 2015, 2021]), vec![2019, 2015, 2021]);
        assert!(expand_years(&[2025, 2022]).is_empty());
    }
}
