use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(SessionError::InvalidConfiguration(format!(
                "unknown gender '{other}'"
            ))),
        }
    }
}

/// Read-only user record supplied once at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    pub name: String,
    pub age: u32,
    pub weight_kg: f64,
    pub gender: Gender,
    #[serde(default)]
    pub height_cm: Option<f64>,
}

impl ExerciseProfile {
    /// Stand-in used when no profile has been entered
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_string(),
            age: 25,
            weight_kg: 70.0,
            gender: Gender::Male,
            height_cm: Some(175.0),
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.age == 0 {
            return Err(SessionError::InvalidConfiguration(
                "age must be positive".to_string(),
            ));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(SessionError::InvalidConfiguration(format!(
                "weight must be positive, got {}",
                self.weight_kg
            )));
        }
        if let Some(height) = self.height_cm {
            if !height.is_finite() || height <= 0.0 {
                return Err(SessionError::InvalidConfiguration(format!(
                    "height must be positive, got {height}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for ExerciseProfile {
    fn default() -> Self {
        Self::guest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_gender_parse_aliases() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("FEMALE".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("other".parse::<Gender>().unwrap(), Gender::Other);
        assert_matches!(
            "robot".parse::<Gender>(),
            Err(SessionError::InvalidConfiguration(_))
        );
    }

    #[test]
    fn test_gender_display() {
        assert_eq!(Gender::Female.to_string(), "female");
    }

    #[test]
    fn test_guest_profile_is_valid() {
        assert!(ExerciseProfile::guest().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_values() {
        let mut profile = ExerciseProfile::guest();
        profile.age = 0;
        assert_matches!(profile.validate(), Err(SessionError::InvalidConfiguration(_)));

        let mut profile = ExerciseProfile::guest();
        profile.weight_kg = 0.0;
        assert_matches!(profile.validate(), Err(SessionError::InvalidConfiguration(_)));

        profile.weight_kg = f64::NAN;
        assert!(profile.validate().is_err());

        let mut profile = ExerciseProfile::guest();
        profile.height_cm = Some(-1.0);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_height_is_optional_in_json() {
        let profile: ExerciseProfile = serde_json::from_str(
            r#"{"name":"Ana","age":31,"weight_kg":58.5,"gender":"female"}"#,
        )
        .unwrap();
        assert_eq!(profile.height_cm, None);
        assert_eq!(profile.gender, Gender::Female);
    }
}
