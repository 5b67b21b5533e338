use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::JudgeError;

/// How harshly magnitudes are scaled before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strictness {
    Lenient,
    #[default]
    Balanced,
    Strict,
    Savage,
}

impl Strictness {
    pub const ALL: [Strictness; 4] = [
        Strictness::Lenient,
        Strictness::Balanced,
        Strictness::Strict,
        Strictness::Savage,
    ];

    pub fn multiplier(&self) -> f64 {
        match self {
            Strictness::Lenient => 0.5,
            Strictness::Balanced => 1.0,
            Strictness::Strict => 1.5,
            Strictness::Savage => 2.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Lenient => "LENIENT",
            Strictness::Balanced => "BALANCED",
            Strictness::Strict => "STRICT",
            Strictness::Savage => "SAVAGE",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Strictness {
    type Err = JudgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strictness::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                JudgeError::InvalidArgument(format!(
                    "unknown strictness {s:?} (expected one of LENIENT, BALANCED, STRICT, SAVAGE)"
                ))
            })
    }
}

/// Scale `base` by `multiplier` and round half up.
///
/// Rejects negative and non-finite multipliers; a zero multiplier yields 0.
pub fn scale(base: u32, multiplier: f64) -> Result<u32, JudgeError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(JudgeError::InvalidArgument(format!(
            "strictness multiplier must be a finite, non-negative number (got {multiplier})"
        )));
    }
    Ok(scale_unchecked(base, multiplier))
}

pub(crate) fn scale_unchecked(base: u32, multiplier: f64) -> u32 {
    // f64::round is half-away-from-zero, which is half-up for non-negative values.
    let scaled = (f64::from(base) * multiplier).round();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}
