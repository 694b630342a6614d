//! Session counters: points, moves left and level targets

use crate::game::TurnResult;

/// Result of recording a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Swap was rejected, nothing spent
    Rejected,
    Scored,
    /// Target reached, the new level number
    LevelUp(u32),
}

/// Scoring state for one session
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Moves still available
    pub moves_left: u32,
    /// Points needed for the next level
    pub target: u64,
    /// Target increase per level
    pub target_step: u64,
    /// Accepted moves so far
    pub turns: u32,
    /// Most cascade passes seen in a single move
    pub best_chain: usize,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(20, 60, 30)
    }
}

impl Score {
    pub fn new(moves: u32, target: u64, target_step: u64) -> Self {
        Self {
            points: 0,
            level: 1,
            moves_left: moves,
            target,
            target_step,
            turns: 0,
            best_chain: 0,
        }
    }

    /// Account for a resolved move. Only accepted moves use up a move.
    pub fn record(&mut self, result: &TurnResult) -> MoveOutcome {
        if !result.accepted {
            return MoveOutcome::Rejected;
        }

        self.turns += 1;
        self.moves_left = self.moves_left.saturating_sub(1);
        self.points += result.score_delta;
        self.best_chain = self.best_chain.max(result.passes);

        if self.points >= self.target {
            self.level += 1;
            self.target += self.target_step * self.level as u64;
            MoveOutcome::LevelUp(self.level)
        } else {
            MoveOutcome::Scored
        }
    }

    pub fn is_out_of_moves(&self) -> bool {
        self.moves_left == 0
    }

    /// Points still missing for the next level
    pub fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.points)
    }
}
