//! Quality tiers for items and cooked food.

use serde::{Deserialize, Serialize};

/// Quality tier of an item stack.
///
/// Ordinals follow the host game's numbering: 0, 1, 2 and 4. Ordinal 3 is
/// not a tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Quality {
    /// Base quality; everything is cooked at this tier first.
    #[default]
    Normal = 0,
    /// Silver star.
    Silver = 1,
    /// Gold star.
    Gold = 2,
    /// Iridium star.
    Iridium = 4,
}

impl Quality {
    /// Returns the host ordinal of this tier.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Converts a host ordinal into a tier.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Normal),
            1 => Some(Self::Silver),
            2 => Some(Self::Gold),
            4 => Some(Self::Iridium),
            _ => None,
        }
    }

    /// Display name for this tier.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Iridium => "Iridium",
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = String;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or_else(|| format!("invalid quality tier {ordinal}"))
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.ordinal()
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
