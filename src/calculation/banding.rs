//! Band year assignment (November to October fiscal cycle)

use chrono::{Datelike, NaiveDate};

/// Month in which a new band year starts
pub const BAND_ROLLOVER_MONTH: u32 = 11;

/// Calendar year that labels the band containing `date`.
/// Dates up to October belong to the band that started the previous November.
pub fn band_year(date: NaiveDate) -> i32 {
    if date.month() < BAND_ROLLOVER_MONTH {
        date.year() - 1
    } else {
        date.year()
    }
}

/// Maps dates to 1-based band indices relative to the earliest band in a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandAssigner {
    first_band_year: i32,
}

impl BandAssigner {
    /// Build from the dates present in a dataset, `None` when there are no dates
    pub fn from_dates<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .map(band_year)
            .min()
            .map(|first_band_year| Self { first_band_year })
    }

    pub fn first_band_year(&self) -> i32 {
        self.first_band_year
    }

    /// Band index of `date` (1 = earliest band of the dataset).
    /// Dates before the first band clamp to band 1.
    pub fn band(&self, date: NaiveDate) -> u32 {
        (band_year(date) - self.first_band_year + 1).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_band_year_rolls_over_in_november() {
        assert_eq!(band_year(date(2023, 10, 31)), 2022);
        assert_eq!(band_year(date(2023, 11, 1)), 2023);
        assert_eq!(band_year(date(2023, 1, 1)), 2022);
        assert_eq!(band_year(date(2023, 12, 31)), 2023);
    }

    #[test]
    fn test_bands_are_relative_to_dataset() {
        let dates = [date(2020, 3, 1), date(2021, 11, 15), date(2023, 10, 31), date(2023, 11, 1)];
        let assigner = BandAssigner::from_dates(dates).unwrap();
        assert_eq!(assigner.first_band_year(), 2019);

        let bands: Vec<u32> = dates.iter().map(|d| assigner.band(*d)).collect();
        assert_eq!(bands, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_october_november_step_is_one_band() {
        let oct = date(2022, 10, 31);
        let nov = date(2022, 11, 1);
        let assigner = BandAssigner::from_dates([oct, nov]).unwrap();
        assert_eq!(assigner.band(oct), 1);
        assert_eq!(assigner.band(nov), 2);
    }

    #[test]
    fn test_band_is_monotonic_in_date() {
        let start = date(2018, 7, 1);
        let dates: Vec<NaiveDate> = (0..2000).map(|i| start + chrono::Duration::days(i)).collect();
        let assigner = BandAssigner::from_dates(dates.iter().copied()).unwrap();

        for pair in dates.windows(2) {
            assert!(assigner.band(pair[0]) <= assigner.band(pair[1]));
        }
    }

    #[test]
    fn test_dates_before_first_band_clamp_to_one() {
        let assigner = BandAssigner::from_dates([date(2022, 5, 1)]).unwrap();
        assert_eq!(assigner.band(date(2019, 1, 1)), 1);
        assert_eq!(assigner.band(date(2022, 11, 1)), 2);
    }

    #[test]
    fn test_no_dates_no_assigner() {
        assert!(BandAssigner::from_dates(std::iter::empty()).is_none());
    }
}
