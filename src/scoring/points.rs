use serde::{Deserialize, Serialize};

/// Qualifying points for P1, P2, P3.
pub const QUALI_POINTS: [u32; 3] = [5, 3, 1];

/// Race points for P1, P2, P3.
pub const RACE_POINTS: [u32; 3] = [10, 8, 6];

pub const FASTEST_LAP_POINTS: u32 = 3;
pub const HAT_TRICK_POINTS: u32 = 2; // Pole + win, same driver
pub const PODIUM_EXACT_POINTS: u32 = 5;
pub const PODIUM_ANY_POINTS: u32 = 2;

/// Streak multiplier tier, highest satisfied threshold wins.
///
/// | streak | multiplier |
/// |--------|------------|
/// | >= 5   | 2.0        |
/// | >= 3   | 1.5        |
/// | >= 0   | 1.0        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    Standard,
    Hot,
    OnFire,
}

const STREAK_THRESHOLDS: [(u32, StreakTier); 3] = [
    (5, StreakTier::OnFire),
    (3, StreakTier::Hot),
    (0, StreakTier::Standard),
];

impl StreakTier {
    pub fn from_streak(streak: u32) -> Self {
        STREAK_THRESHOLDS
            .iter()
            .find(|(threshold, _)| streak >= *threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(StreakTier::Standard)
    }

    /// Exact ratio as (numerator, denominator)
    fn ratio(self) -> (u32, u32) {
        match self {
            StreakTier::Standard => (1, 1),
            StreakTier::Hot => (3, 2),
            StreakTier::OnFire => (2, 1),
        }
    }

    pub fn multiplier(self) -> f64 {
        let (num, den) = self.ratio();
        num as f64 / den as f64
    }

    /// floor(points x multiplier), computed in integers.
    pub fn apply(self, points: u32) -> u32 {
        let (num, den) = self.ratio();
        points * num / den
    }

    pub fn label(self) -> &'static str {
        match self {
            StreakTier::Standard => "standard",
            StreakTier::Hot => "hot streak",
            StreakTier::OnFire => "on fire",
        }
    }
}

/// Podium trio bonus. The tiers are exclusive: an exact trio never also
/// counts as an any-order trio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodiumTier {
    Miss,
    AnyOrder,
    ExactOrder,
}

impl PodiumTier {
    pub fn points(self) -> u32 {
        match self {
            PodiumTier::Miss => 0,
            PodiumTier::AnyOrder => PODIUM_ANY_POINTS,
            PodiumTier::ExactOrder => PODIUM_EXACT_POINTS,
        }
    }
}
