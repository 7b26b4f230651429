// Defaults for endpoints and models, overridable from the environment.

use std::env;

pub const DEFAULT_STEAM_STORE_URL: &str = "https://store.steampowered.com";

lazy_static::lazy_static! {
    pub static ref STEAM_STORE_URL: String = env::var("STEAM_STORE_URL").unwrap_or_else(|_| DEFAULT_STEAM_STORE_URL.to_string());
    pub static ref GEMINI_API_URL: String = env::var("GEMINI_API_URL").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    // Summaries and suggestions run on the cheaper model, chat on the newer one.
    pub static ref SUMMARY_MODEL: String = env::var("STEAMSAGE_SUMMARY_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());
    pub static ref CHAT_MODEL: String = env::var("STEAMSAGE_CHAT_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
}

pub const API_KEY_VAR: &str = "GOOGLE_AI_KEY";

// Category 998 is for games only
pub const SEARCH_CATEGORY: &str = "998";
pub const MAX_SEARCH_RESULTS: usize = 10;
pub const MAX_SELECTED_GAMES: usize = 3;

pub const REVIEW_QUERY: &[(&str, &str)] = &[
    ("use_review_quality", "1"),
    ("cursor", "*"),
    ("day_range", "30"),
    ("start_date", "-1"),
    ("end_date", "-1"),
    ("date_range_type", "all"),
    ("filter", "summary"),
    ("language", "english"),
    ("l", "english"),
    ("review_type", "all"),
    ("purchase_type", "all"),
    ("playtime_filter_min", "0"),
    ("playtime_filter_max", "0"),
    ("filter_offtopic_activity", "1"),
    ("summary_num_positive_reviews", "30"),
    ("summary_num_reviews", "15"),
    ("json", "1"),
];

/// Reviews with this many words or fewer are dropped.
pub const MIN_REVIEW_WORDS: usize = 7;
/// Reviews with at least this many "funny" votes are treated as jokes.
pub const MAX_FUNNY_VOTES: u64 = 40;

pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Pick one for me!",
    "Do I need a friend to enjoy them?",
    "Are they well optimized?",
];

pub const CHAT_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";
pub const SUMMARY_ERROR_MARKER: &str = "[ERROR]";
