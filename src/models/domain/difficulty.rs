use std::{fmt, str::FromStr};

use crate::errors::AppError;

/// The level a player picks on the level-select screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Difficulty values the trivia API accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
        DifficultyTier::Expert,
    ];

    pub fn api_difficulty(&self) -> ApiDifficulty {
        match self {
            DifficultyTier::Easy => ApiDifficulty::Easy,
            DifficultyTier::Medium => ApiDifficulty::Medium,
            // the API has no expert level
            DifficultyTier::Hard | DifficultyTier::Expert => ApiDifficulty::Hard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
            DifficultyTier::Expert => "expert",
        }
    }
}

impl ApiDifficulty {
    /// Maps a raw level name to an API difficulty, falling back to medium.
    pub fn from_level(level: &str) -> Self {
        level
            .parse::<DifficultyTier>()
            .map(|tier| tier.api_difficulty())
            .unwrap_or(ApiDifficulty::Medium)
    }

    pub fn as_query_value(&self) -> &'static str {
        match self {
            ApiDifficulty::Easy => "easy",
            ApiDifficulty::Medium => "medium",
            ApiDifficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DifficultyTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            "expert" => Ok(DifficultyTier::Expert),
            other => Err(AppError::ValidationError(format!(
                "Unknown difficulty level '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expert_aliases_to_hard() {
        assert_eq!(DifficultyTier::Expert.api_difficulty(), ApiDifficulty::Hard);
        assert_eq!(DifficultyTier::Hard.api_difficulty(), ApiDifficulty::Hard);
        assert_eq!(DifficultyTier::Easy.api_difficulty(), ApiDifficulty::Easy);
        assert_eq!(
            DifficultyTier::Medium.api_difficulty(),
            ApiDifficulty::Medium
        );
    }

    #[test]
    fn unknown_level_maps_to_medium() {
        assert_eq!(ApiDifficulty::from_level("nightmare"), ApiDifficulty::Medium);
        assert_eq!(ApiDifficulty::from_level(""), ApiDifficulty::Medium);
        assert_eq!(ApiDifficulty::from_level("expert"), ApiDifficulty::Hard);
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(" Easy ".parse::<DifficultyTier>(), Ok(DifficultyTier::Easy));
        assert_eq!("EXPERT".parse::<DifficultyTier>(), Ok(DifficultyTier::Expert));

        let parsed = "legendary".parse::<DifficultyTier>();
        assert!(matches!(parsed, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn display_matches_parse() {
        for tier in DifficultyTier::ALL {
            assert_eq!(tier.to_string().parse::<DifficultyTier>(), Ok(tier));
        }
    }
}
