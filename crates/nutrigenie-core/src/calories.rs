use nutrigenie_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;
pub const MIN_HEIGHT_CM: f64 = 50.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;
pub const MIN_WEIGHT_KG: f64 = 10.0;
pub const MAX_WEIGHT_KG: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(Error::Validation(format!("unknown sex: {other}"))),
        }
    }
}

/// Activity-level category mapped to a fixed TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::LightlyActive,
        Self::ModeratelyActive,
        Self::VeryActive,
        Self::ExtraActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtraActive => 1.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary (little or no exercise)",
            Self::LightlyActive => "Lightly active (light exercise/sports 1-3 days a week)",
            Self::ModeratelyActive => "Moderately active (moderate exercise/sports 3-5 days a week)",
            Self::VeryActive => "Very active (hard exercise/sports 6-7 days a week)",
            Self::ExtraActive => "Extra active (very hard exercise/sports and a physical job)",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Ok(Self::Sedentary),
            "light" | "lightly_active" => Ok(Self::LightlyActive),
            "moderate" | "moderately_active" => Ok(Self::ModeratelyActive),
            "very" | "very_active" => Ok(Self::VeryActive),
            "extra" | "extra_active" => Ok(Self::ExtraActive),
            other => Err(Error::Validation(format!("unknown activity level: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(Error::Validation(format!(
                "age must be between {MIN_AGE} and {MAX_AGE} years, got {}",
                self.age
            )));
        }
        if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&self.height_cm) {
            return Err(Error::Validation(format!(
                "height must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM} cm, got {}",
                self.height_cm
            )));
        }
        if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&self.weight_kg) {
            return Err(Error::Validation(format!(
                "weight must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }

    /// Basal metabolic rate via the Mifflin-St Jeor equation.
    pub fn bmr(&self) -> f64 {
        let sex_term = match self.sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };
        10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * self.age as f64 + sex_term
    }
}

/// Estimated daily calorie needs in whole kcal, truncated.
///
/// Extreme but in-range profiles (old, very short, very light) can drive
/// the Mifflin-St Jeor BMR non-positive; those are rejected rather than
/// reported as 0 kcal.
pub fn daily_calories(profile: &Profile) -> Result<u32> {
    profile.validate()?;
    let bmr = profile.bmr();
    if bmr <= 0.0 {
        return Err(Error::Validation(format!(
            "profile yields a non-positive basal metabolic rate ({bmr:.1})"
        )));
    }
    Ok((bmr * profile.activity.multiplier()) as u32)
}
