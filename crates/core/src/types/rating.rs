//! Product rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The rating value is outside `0..=5`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between 0 and 5 (got {0})")]
pub struct RatingError(pub i64);

/// Aggregate product rating, an integer out of five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest possible rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values above [`Rating::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `RatingError` if `stars` is greater than five.
    pub fn new(stars: u8) -> Result<Self, RatingError> {
        Self::try_from(i64::from(stars))
    }

    /// Number of stars.
    #[must_use]
    pub const fn stars(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|stars| *stars <= Self::MAX)
            .map(Self)
            .ok_or(RatingError(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX - self.0);
        write!(f, "{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}
