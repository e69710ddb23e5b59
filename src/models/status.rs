//! Lineup status of a roster player.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Predicted involvement of a player in the next fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// In the predicted starting eleven, uncontested
    LikelyStart,
    /// In the predicted starting eleven with a competing alternative
    StartWithAlternative,
    /// Listed as the second option for a starting slot
    IsAlternative,
    /// Known squad member outside the starting eleven
    Bench,
    /// Unknown or not in the squad
    Out,
}

impl PlayerStatus {
    /// Icon identifier for the host UI.
    pub fn icon(self) -> &'static str {
        match self {
            PlayerStatus::LikelyStart => "checkmark.circle.fill",
            PlayerStatus::StartWithAlternative => "1.circle.fill",
            PlayerStatus::IsAlternative => "2.circle.fill",
            PlayerStatus::Bench => "person.fill.badge.minus",
            PlayerStatus::Out => "xmark.circle.fill",
        }
    }

    /// Color token for the host UI.
    pub fn color(self) -> &'static str {
        match self {
            PlayerStatus::LikelyStart => "green",
            PlayerStatus::StartWithAlternative | PlayerStatus::IsAlternative => "orange",
            PlayerStatus::Bench => "gray",
            PlayerStatus::Out => "red",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerStatus::LikelyStart => "likely start",
            PlayerStatus::StartWithAlternative => "start (with alternative)",
            PlayerStatus::IsAlternative => "alternative",
            PlayerStatus::Bench => "bench",
            PlayerStatus::Out => "out",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons_are_distinct() {
        let all = [
            PlayerStatus::LikelyStart,
            PlayerStatus::StartWithAlternative,
            PlayerStatus::IsAlternative,
            PlayerStatus::Bench,
            PlayerStatus::Out,
        ];
        let icons: std::collections::HashSet<_> = all.iter().map(|s| s.icon()).collect();
        assert_eq!(icons.len(), all.len());
    }

    #[test]
    fn test_colors() {
        assert_eq!(PlayerStatus::LikelyStart.color(), "green");
        assert_eq!(PlayerStatus::IsAlternative.color(), "orange");
        assert_eq!(PlayerStatus::Bench.color(), "gray");
        assert_eq!(PlayerStatus::Out.color(), "red");
    }
}
