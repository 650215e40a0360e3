use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// The single per-installation user profile. Replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "birthDateISO", deserialize_with = "instant::deserialize")]
    pub birth_date: NaiveDateTime,
    pub sex: Sex,
    #[serde(
        rename = "nationalityCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub nationality_code: Option<String>,
    /// Domain-valid range 40..=120; validated at the input boundary.
    #[serde(rename = "lifeExpectancyYears")]
    pub life_expectancy_years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "themeId")]
    pub theme_id: String,
    #[serde(
        rename = "backgroundImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme_id: "turquoise".into(),
            background_image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn profile_serializes_with_original_field_names() {
        let profile = UserProfile {
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            sex: Sex::Male,
            nationality_code: Some("ES".into()),
            life_expectancy_years: 84,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["birthDateISO"], "1990-01-01T00:00:00");
        assert_eq!(json["sex"], "male");
        assert_eq!(json["nationalityCode"], "ES");
        assert_eq!(json["lifeExpectancyYears"], 84);
    }

    #[test]
    fn default_settings() {
        let settings = UserSettings::default();
        assert_eq!(settings.theme_id, "turquoise");
        assert!(settings.background_image.is_none());
    }
}
