use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;

use super::countdown::{self, CountdownTime};
use super::profile::UserProfile;

pub const GLOBAL_LIFE_EXPECTANCY: u32 = 82;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub name: &'static str,
    pub life_expectancy: u32,
}

/// Country code → life expectancy in years. The first entry is the global
/// fallback used for unknown or absent codes.
static COUNTRIES: Lazy<Vec<Country>> = Lazy::new(|| {
    vec![
        Country { code: "GLOBAL", name: "Global / unspecified", life_expectancy: GLOBAL_LIFE_EXPECTANCY },
        Country { code: "ES", name: "Spain", life_expectancy: 84 },
        Country { code: "IT", name: "Italy", life_expectancy: 84 },
        Country { code: "FR", name: "France", life_expectancy: 83 },
        Country { code: "DE", name: "Germany", life_expectancy: 81 },
        Country { code: "PT", name: "Portugal", life_expectancy: 82 },
        Country { code: "GB", name: "United Kingdom", life_expectancy: 81 },
        Country { code: "US", name: "United States", life_expectancy: 79 },
        Country { code: "CA", name: "Canada", life_expectancy: 83 },
        Country { code: "MX", name: "Mexico", life_expectancy: 75 },
        Country { code: "AR", name: "Argentina", life_expectancy: 77 },
        Country { code: "CL", name: "Chile", life_expectancy: 81 },
        Country { code: "BR", name: "Brazil", life_expectancy: 76 },
        Country { code: "JP", name: "Japan", life_expectancy: 85 },
        Country { code: "KR", name: "South Korea", life_expectancy: 84 },
        Country { code: "CN", name: "China", life_expectancy: 77 },
        Country { code: "AU", name: "Australia", life_expectancy: 84 },
        Country { code: "NZ", name: "New Zealand", life_expectancy: 82 },
        Country { code: "SE", name: "Sweden", life_expectancy: 83 },
        Country { code: "NO", name: "Norway", life_expectancy: 82 },
        Country { code: "NL", name: "Netherlands", life_expectancy: 83 },
    ]
});

pub fn countries() -> &'static [Country] {
    &COUNTRIES
}

pub fn country_by_code(code: Option<&str>) -> &'static Country {
    code.and_then(|code| COUNTRIES.iter().find(|c| c.code == code))
        .unwrap_or(&COUNTRIES[0])
}

pub fn life_expectancy_for_country(code: Option<&str>) -> u32 {
    country_by_code(code).life_expectancy
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.month0() + months;
    let new_year = date.year() + (total_months / 12) as i32;
    let new_month = (total_months % 12) + 1;
    // Clamp day to valid range for the new month
    let max_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(
        if month == 12 { year + 1 } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )
    .unwrap()
    .pred_opt()
    .unwrap()
    .day()
}

/// Birth instant plus the profile's life expectancy in calendar years,
/// normalized to the final instant of that day. Recomputed on every call;
/// never cached across profile edits.
pub fn estimated_end_of_life(profile: &UserProfile) -> NaiveDateTime {
    let end_date = add_months(profile.birth_date.date(), profile.life_expectancy_years * 12);
    end_date.and_hms_milli_opt(23, 59, 59, 999).unwrap()
}

pub fn life_countdown(profile: &UserProfile, now: NaiveDateTime) -> CountdownTime {
    countdown::signed_delta(estimated_end_of_life(profile), now)
}

pub fn life_countdown_now(profile: &UserProfile) -> CountdownTime {
    life_countdown(profile, super::now())
}

/// Whole years between birth and `now`, one less than the naive year
/// difference while this year's birthday is still ahead.
pub fn age(birth: NaiveDateTime, now: NaiveDateTime) -> i32 {
    let mut years = now.year() - birth.year();
    if (now.month(), now.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// Build a deadline instant from a calendar date and an optional HH:MM;
/// without a time the deadline lands on the last second of the day.
pub fn deadline_from_date(date: NaiveDate, time: Option<(u32, u32)>) -> NaiveDateTime {
    match time {
        Some((hour, minute)) => date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| date.and_hms_opt(23, 59, 59).unwrap()),
        None => date.and_hms_opt(23, 59, 59).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::Sex;

    fn profile(birth: NaiveDateTime, years: u32) -> UserProfile {
        UserProfile {
            birth_date: birth,
            sex: Sex::Male,
            nationality_code: None,
            life_expectancy_years: years,
        }
    }

    fn at(y: i32, mo: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn unknown_country_falls_back_to_global() {
        assert_eq!(life_expectancy_for_country(Some("ES")), 84);
        assert_eq!(life_expectancy_for_country(Some("XX")), GLOBAL_LIFE_EXPECTANCY);
        assert_eq!(life_expectancy_for_country(None), GLOBAL_LIFE_EXPECTANCY);
    }

    #[test]
    fn end_of_life_lands_on_last_instant_of_day() {
        let end = estimated_end_of_life(&profile(at(1990, 1, 1), 80));
        assert_eq!(
            end,
            NaiveDate::from_ymd_opt(2070, 1, 1)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn leap_day_birth_clamps() {
        let end = estimated_end_of_life(&profile(at(2000, 2, 29), 81));
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2081, 2, 28).unwrap());
    }

    #[test]
    fn life_countdown_sign() {
        let p = profile(at(1990, 1, 1), 80);
        let before = life_countdown(&p, at(2069, 12, 31));
        assert!(before.total_ms > 0);
        let after = life_countdown(&p, at(2070, 1, 2));
        assert!(after.total_ms < 0);
    }

    #[test]
    fn age_respects_unreached_birthday() {
        let birth = at(1990, 6, 15);
        assert_eq!(age(birth, at(2026, 6, 14)), 35);
        assert_eq!(age(birth, at(2026, 6, 15)), 36);
        assert_eq!(age(birth, at(2026, 8, 26)), 36);
    }

    #[test]
    fn deadline_defaults_to_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(
            deadline_from_date(date, None),
            date.and_hms_opt(23, 59, 59).unwrap()
        );
        assert_eq!(
            deadline_from_date(date, Some((9, 30))),
            date.and_hms_opt(9, 30, 0).unwrap()
        );
    }
}
