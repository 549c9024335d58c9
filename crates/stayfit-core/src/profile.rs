//! User profile: body metrics plus fitness goal, and their validation.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepted age range, in years.
pub const AGE_YEARS: RangeInclusive<u32> = 1..=120;
/// Accepted weight range, in kilograms.
pub const WEIGHT_KG: RangeInclusive<f64> = 1.0..=500.0;
/// Accepted height range, in centimetres.
pub const HEIGHT_CM: RangeInclusive<f64> = 30.0..=300.0;

/// Why a profile was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("age {0} is out of range (expected 1-120 years)")]
    AgeOutOfRange(u32),

    #[error("weight {0} is out of range (expected 1-500 kg)")]
    WeightOutOfRange(f64),

    #[error("height {0} is out of range (expected 30-300 cm)")]
    HeightOutOfRange(f64),

    #[error("unknown fitness goal {0:?} (expected muscle_gain, fat_loss, or weight_gain)")]
    UnknownGoal(String),
}

// ---------------------------------------------------------------------------

/// What the user is training for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    MuscleGain,
    FatLoss,
    WeightGain,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 3] = [Self::MuscleGain, Self::FatLoss, Self::WeightGain];

    /// Identifier form, e.g. `muscle_gain`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MuscleGain => "muscle_gain",
            Self::FatLoss => "fat_loss",
            Self::WeightGain => "weight_gain",
        }
    }

    /// Human-readable form, e.g. `muscle gain`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MuscleGain => "muscle gain",
            Self::FatLoss => "fat loss",
            Self::WeightGain => "weight gain",
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitnessGoal {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "muscle_gain" => Ok(Self::MuscleGain),
            "fat_loss" => Ok(Self::FatLoss),
            "weight_gain" => Ok(Self::WeightGain),
            other => Err(ProfileError::UnknownGoal(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------

/// A user's physical attributes and fitness goal.
///
/// Stored as the `users/{uid}` document; field names follow the document
/// layout (`fitnessGoal`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Years.
    pub age: u32,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
    pub fitness_goal: FitnessGoal,
}

impl UserProfile {
    /// Build a validated profile. The name is trimmed.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        weight: f64,
        height: f64,
        fitness_goal: FitnessGoal,
    ) -> Result<Self, ProfileError> {
        let profile = Self {
            name: name.into().trim().to_string(),
            age,
            weight,
            height,
            fitness_goal,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if !AGE_YEARS.contains(&self.age) {
            return Err(ProfileError::AgeOutOfRange(self.age));
        }
        // NaN fails `contains`, so non-finite values are rejected here too.
        if !WEIGHT_KG.contains(&self.weight) {
            return Err(ProfileError::WeightOutOfRange(self.weight));
        }
        if !HEIGHT_CM.contains(&self.height) {
            return Err(ProfileError::HeightOutOfRange(self.height));
        }
        Ok(())
    }

    /// Body mass index: weight / (height in metres)^2.
    pub fn bmi(&self) -> f64 {
        let metres = self.height / 100.0;
        self.weight / (metres * metres)
    }
}
