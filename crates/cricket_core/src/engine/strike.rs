use crate::models::Batters;

/// Decides when the batters change ends.
pub struct StrikeRotation;

impl StrikeRotation {
    /// Exchanges striker and non-striker.
    pub fn swap(batters: &mut Batters) {
        std::mem::swap(&mut batters.striker, &mut batters.non_striker);
    }

    /// Odd runs (1, 3, 5) cross the batters. Returns whether a swap happened.
    pub fn after_runs(batters: &mut Batters, runs: u8) -> bool {
        if runs % 2 == 1 {
            Self::swap(batters);
            true
        } else {
            false
        }
    }

    /// End of over always changes ends, regardless of the last ball.
    pub fn end_of_over(batters: &mut Batters) {
        Self::swap(batters);
    }
}
