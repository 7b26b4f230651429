use serde::{Deserialize, Serialize};

/// One row of the Steam search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub app_id: String,
    pub title: String,
    pub release_date: String,
    pub image_url: String,
    pub url: String,
}

/// Steam app ids are plain decimal numbers.
pub fn is_app_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review: String,
    #[serde(default)]
    pub votes_funny: u64,
    #[serde(default)]
    pub recommendationid: Option<String>,
    #[serde(default)]
    pub voted_up: Option<bool>,
    #[serde(default)]
    pub votes_up: Option<u64>,
    #[serde(default)]
    pub weighted_vote_score: Option<serde_json::Value>,
}

impl Review {
    pub fn new(review: impl Into<String>, votes_funny: u64) -> Self {
        Self {
            review: review.into(),
            votes_funny,
            recommendationid: None,
            voted_up: None,
            votes_up: None,
            weighted_vote_score: None,
        }
    }
}

/// Payload of the `appreviews` endpoint, stamped with the requested game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewList {
    pub app_id: String,
    pub title: String,
    pub reviews: Vec<Review>,
}

impl ReviewList {
    /// Review texts joined by newlines, the form the summary prompt expects.
    pub fn joined_text(&self) -> String {
        self.reviews
            .iter()
            .map(|r| r.review.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ReviewResponse> for ReviewList {
    fn from(response: ReviewResponse) -> Self {
        Self {
            app_id: response.app_id,
            title: response.title,
            reviews: response.reviews,
        }
    }
}
