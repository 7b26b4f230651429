use serde::Serialize;

use crate::constants::MAX_SELECTED_GAMES;
use crate::models::{GameResult, ReviewList};
use crate::review_manager::Digest;
use crate::summary::SummaryResponse;
use crate::ChatHistory;

/// The user's chosen games: ordered, at most three, unique by app id.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Selection {
    games: Vec<GameResult>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the selection is full or already holds the game.
    pub fn add(&mut self, game: GameResult) -> bool {
        if self.is_full() || self.contains(&game.app_id) {
            return false;
        }
        self.games.push(game);
        true
    }

    pub fn remove(&mut self, app_id: &str) -> bool {
        let before = self.games.len();
        self.games.retain(|g| g.app_id != app_id);
        self.games.len() != before
    }

    pub fn contains(&self, app_id: &str) -> bool {
        self.games.iter().any(|g| g.app_id == app_id)
    }

    pub fn is_full(&self) -> bool {
        self.games.len() >= MAX_SELECTED_GAMES
    }

    pub fn games(&self) -> &[GameResult] {
        &self.games
    }
}

/// Everything one user has on screen. Owned by whoever drives the UI.
#[derive(Debug, Default)]
pub struct Session {
    pub selection: Selection,
    pub reviews: Vec<ReviewList>,
    pub summaries: Vec<SummaryResponse>,
    pub suggestions: Vec<String>,
    pub chat: ChatHistory,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces reviews and summaries with the result of a new run.
    pub fn apply_digest(&mut self, digest: Digest) {
        self.reviews = digest.reviews;
        self.summaries = digest.summaries;
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }
}
