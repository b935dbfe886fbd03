//! Player name validation.
//!
//! Names end up in log lines, leaderboard output, and congratulation text, so
//! control characters and empty or whitespace-only input are rejected up
//! front. The rules are deliberately loose otherwise; unicode names are fine.

use thiserror::Error;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LENGTH: usize = 30;

/// Player name validation errors with player-facing messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Player name cannot be empty")]
    Empty,

    #[error("Player name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Player name contains control characters")]
    ControlCharacters,
}

/// Validate and normalize a player name. Returns the trimmed name.
pub fn validate_player_name(name: &str) -> Result<String, NameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong {
            max: MAX_NAME_LENGTH,
        });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(NameError::ControlCharacters);
    }
    Ok(trimmed.to_string())
}
