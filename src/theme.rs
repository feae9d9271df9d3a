//! Background theme selection
//!
//! The theme escalates with score. A manual cycle overrides it until the next
//! pipe is scored. Colours and particles belong to the renderer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Day,
    Night,
    Rain,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
            Theme::Rain => "rain",
        }
    }

    /// Theme for a run score
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=1 => Theme::Day,
            2 => Theme::Night,
            _ => Theme::Rain,
        }
    }

    /// Manual cycle: day → night → rain → day
    pub fn next(&self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Rain,
            Theme::Rain => Theme::Day,
        }
    }
}

/// Current theme plus the score it was last escalated for
#[derive(Debug, Clone, Default)]
pub struct ThemeState {
    current: Theme,
    last_score: u32,
}

impl ThemeState {
    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn cycle(&mut self) -> Theme {
        self.current = self.current.next();
        self.current
    }

    /// Re-apply escalation when the score changes
    pub fn on_score(&mut self, score: u32) {
        if score != self.last_score {
            self.last_score = score;
            self.current = Theme::for_score(score);
        }
    }

    /// New run: back to the score-0 theme
    pub fn reset(&mut self) {
        self.last_score = 0;
        self.current = Theme::for_score(0);
    }
}
