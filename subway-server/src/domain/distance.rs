//! Segment length type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a distance would not be strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid distance {value}: must be greater than zero")]
pub struct InvalidDistance {
    value: i128,
}

impl InvalidDistance {
    /// The offending value (may be the result of a subtraction).
    pub fn value(&self) -> i128 {
        self.value
    }
}

/// A strictly positive track length.
///
/// Any `Distance` value is greater than zero by construction, and no
/// operation on it can produce a zero or negative length.
///
/// # Examples
///
/// ```
/// use subway_server::domain::Distance;
///
/// let ten = Distance::new(10).unwrap();
/// let four = Distance::new(4).unwrap();
/// assert_eq!(ten.subtract(four).unwrap().get(), 6);
///
/// // Zero and negative lengths are rejected
/// assert!(Distance::new(0).is_err());
/// assert!(Distance::new(-3).is_err());
///
/// // So is a subtraction that would empty the distance
/// assert!(four.subtract(ten).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u64")]
pub struct Distance(u64);

impl Distance {
    /// Create a distance from a signed value.
    ///
    /// Returns an error if `value <= 0`.
    pub fn new(value: i64) -> Result<Self, InvalidDistance> {
        if value <= 0 {
            return Err(InvalidDistance {
                value: value.into(),
            });
        }
        Ok(Distance(value as u64))
    }

    /// Returns the length as an integer.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Sum of two distances. Saturates at `u64::MAX`.
    pub fn add(self, other: Distance) -> Distance {
        Distance(self.0.saturating_add(other.0))
    }

    /// Difference of two distances.
    ///
    /// Fails if the result would be zero or negative.
    pub fn subtract(self, other: Distance) -> Result<Distance, InvalidDistance> {
        match self.0.checked_sub(other.0) {
            Some(rest) if rest > 0 => Ok(Distance(rest)),
            _ => Err(InvalidDistance {
                value: i128::from(self.0) - i128::from(other.0),
            }),
        }
    }
}

impl TryFrom<i64> for Distance {
    type Error = InvalidDistance;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Distance::new(value)
    }
}

impl From<Distance> for u64 {
    fn from(distance: Distance) -> Self {
        distance.0
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({})", self.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
