// Sequences one "get reviews" run: fetch every selected game's reviews, drop the
// games with nothing left after filtering, then summarize the rest.

use futures::future::{join_all, try_join_all};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::{SageError, SageResult};
use crate::llm_interaction::GeminiClient;
use crate::models::{GameResult, ReviewList};
use crate::store::SteamStore;
use crate::summary::{fetch_ai_summary, parse_summary, SummaryResponse};

/// Output of one run. `summaries` lines up with the non-empty entries of `reviews`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digest {
    pub reviews: Vec<ReviewList>,
    pub summaries: Vec<SummaryResponse>,
}

/// All-or-nothing: one failed game fails the batch. Output follows input order.
#[instrument(skip_all, fields(games = games.len()))]
pub async fn fetch_all_reviews(store: &SteamStore, games: &[GameResult]) -> SageResult<Vec<ReviewList>> {
    let requests = games
        .iter()
        .map(|game| store.fetch_reviews(&game.app_id, &game.title));
    let responses = try_join_all(requests).await?;
    Ok(responses.into_iter().map(ReviewList::from).collect())
}

pub fn filter_empty_reviews(reviews: &[ReviewList]) -> Vec<ReviewList> {
    reviews
        .iter()
        .filter(|list| !list.reviews.is_empty())
        .cloned()
        .collect()
}

async fn summarize(ai: &GeminiClient, config: &Config, list: &ReviewList) -> SageResult<SummaryResponse> {
    if list.reviews.is_empty() {
        return Err(SageError::EmptyResult("No reviews found".to_string()));
    }
    let raw = fetch_ai_summary(ai, config, &list.joined_text(), &list.title).await?;
    parse_summary(&raw, &list.title)
}

/// Summarizes every game concurrently. A failure only affects its own game,
/// which gets an `[ERROR]` placeholder.
#[instrument(skip_all, fields(games = reviews.len()))]
pub async fn fetch_all_summaries(
    ai: &GeminiClient,
    config: &Config,
    reviews: &[ReviewList],
) -> Vec<SummaryResponse> {
    let requests = reviews.iter().map(|list| async move {
        match summarize(ai, config, list).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(app_id = %list.app_id, error = %e, "Summary failed");
                SummaryResponse::failed(list.title.clone(), e)
            }
        }
    });
    join_all(requests).await
}

pub struct ReviewManager {
    config: Config,
    store: SteamStore,
    ai: GeminiClient,
    running: Mutex<()>,
}

impl ReviewManager {
    pub fn new(config: Config) -> Self {
        info!("Initializing review manager...");
        Self {
            store: SteamStore::new(&config),
            ai: GeminiClient::new(&config),
            config,
            running: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SteamStore {
        &self.store
    }

    pub fn ai(&self) -> &GeminiClient {
        &self.ai
    }

    /// Fetch, filter and summarize. No AI calls are made when no game has reviews left.
    pub async fn digest(&self, games: &[GameResult]) -> SageResult<Digest> {
        info!("Fetching reviews for {} games", games.len());
        let reviews = fetch_all_reviews(&self.store, games).await?;

        let with_reviews = filter_empty_reviews(&reviews);
        if with_reviews.is_empty() {
            info!("No game has reviews left after filtering");
            return Ok(Digest {
                reviews,
                summaries: Vec::new(),
            });
        }

        let summaries = fetch_all_summaries(&self.ai, &self.config, &with_reviews).await;
        Ok(Digest { reviews, summaries })
    }

    /// Like `digest`, but returns `None` while another guarded run is in progress.
    pub async fn try_digest(&self, games: &[GameResult]) -> Option<SageResult<Digest>> {
        let _guard = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Review digest already running, refusing a second one");
                return None;
            }
        };
        Some(self.digest(games).await)
    }
}
