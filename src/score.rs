use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Outcome {
    /// Won with this many tries still unused.
    Won { tries_remaining: u32 },
    Lost,
}

/// ScoringPolicy turns the outcome of a game into leaderboard points.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ScoringPolicy {
    pub win_multiplier: u32,
    pub loss_score: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy {
            win_multiplier: 2,
            loss_score: 1,
        }
    }
}

impl ScoringPolicy {
    pub fn points(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Won { tries_remaining } => tries_remaining
                .saturating_add(1)
                .saturating_mul(self.win_multiplier),
            Outcome::Lost => self.loss_score,
        }
    }
}

/// Score represents a user's score.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub name: String,
    pub games: u32,
    pub wins: u32,
    #[serde(default)]
    pub points: u32,
}

impl Score {
    /// Records a finished game worth `points`.
    pub fn record(&mut self, outcome: Outcome, points: u32) {
        if let Outcome::Won { .. } = outcome {
            self.wins += 1;
        }
        self.points = self.points.saturating_add(points);
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = if self.games == 0 {
            0.0
        } else {
            self.wins as f32 / self.games as f32 * 100.0
        };
        write!(
            f,
            "{} pts, {:.0}% won ({}/{})",
            self.points, pct, self.wins, self.games
        )
    }
}

/// `leaderboard` returns the top `n` scores: most points first, then most wins, then by name.
pub fn leaderboard<'a>(scores: impl IntoIterator<Item = &'a Score>, n: usize) -> Vec<Score> {
    let mut ranked: Vec<Score> = scores.into_iter().cloned().collect();
    ranked.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.wins.cmp(&a.wins))
            .then(a.name.cmp(&b.name))
    });
    ranked.truncate(n);
    ranked
}
