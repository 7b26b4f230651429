// Steam store access: the search results page and the appreviews JSON endpoint.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::constants::{
    MAX_FUNNY_VOTES, MAX_SEARCH_RESULTS, MIN_REVIEW_WORDS, REVIEW_QUERY, SEARCH_CATEGORY,
};
use crate::error::{SageError, SageResult};
use crate::models::{GameResult, ReviewResponse};

#[derive(Debug, Clone)]
pub struct SteamStore {
    client: Client,
    base_url: String,
}

impl SteamStore {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.store_url.clone(),
        }
    }

    /// Searches the store and returns the ten most relevant games.
    #[instrument(skip(self))]
    pub async fn fetch_games(&self, query: &str) -> SageResult<Vec<GameResult>> {
        let url = format!("{}/search/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("category1", SEARCH_CATEGORY), ("term", query)])
            .send()
            .await
            .map_err(|e| {
                error!("Error fetching games: {}", e);
                SageError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Steam search request failed");
            return Err(SageError::Transport(format!(
                "Failed to search for games (status {})",
                status
            )));
        }

        let html = response.text().await?;
        let games = extract_game_list(&html);
        info!(count = games.len(), "Extracted games from search results");
        Ok(games)
    }

    /// Fetches the review summary for one game and filters out low-signal entries.
    #[instrument(skip(self))]
    pub async fn fetch_reviews(&self, app_id: &str, title: &str) -> SageResult<ReviewResponse> {
        let url = format!("{}/appreviews/{}", self.base_url, app_id);
        let response = self
            .client
            .get(&url)
            .query(REVIEW_QUERY)
            .send()
            .await
            .map_err(|e| {
                error!("Error fetching reviews: {}", e);
                SageError::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!(%status, "Steam reviews request failed");
            return Err(SageError::Transport(format!(
                "Failed to fetch reviews (status {})",
                status
            )));
        }

        let mut data = response.json::<ReviewResponse>().await.map_err(|e| {
            error!("Error decoding reviews: {}", e);
            SageError::from(e)
        })?;

        if data.reviews.is_empty() {
            error!("App {} returned no reviews", app_id);
            return Err(SageError::EmptyResult(
                "App does not exist or does not have any reviews".to_string(),
            ));
        }

        // The endpoint does not echo the game back
        data.app_id = app_id.to_string();
        data.title = title.to_string();

        let filtered = filter_reviews(data);
        debug!(kept = filtered.reviews.len(), "Filtered reviews");
        Ok(filtered)
    }
}

lazy_static::lazy_static! {
    static ref ROW_SELECTOR: Selector = Selector::parse(".search_result_row").expect("valid selector");
    static ref TITLE_SELECTOR: Selector = Selector::parse(".title").expect("valid selector");
    static ref RELEASED_SELECTOR: Selector = Selector::parse(".search_released").expect("valid selector");
    static ref IMAGE_SELECTOR: Selector = Selector::parse(".search_capsule img").expect("valid selector");
}

fn first_attr(row: &ElementRef<'_>, sel: &Selector, attr: &str) -> Option<String> {
    row.select(sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

fn text_of(row: &ElementRef<'_>, sel: &Selector) -> String {
    row.select(sel).flat_map(|el| el.text()).collect()
}

/// Pulls up to ten complete game records out of a search results page.
/// Rows missing any field are skipped.
pub fn extract_game_list(html: &str) -> Vec<GameResult> {
    let document = Html::parse_document(html);

    let mut games = Vec::new();
    for row in document.select(&ROW_SELECTOR) {
        if games.len() >= MAX_SEARCH_RESULTS {
            break;
        }

        let app_id = row.value().attr("data-ds-appid").unwrap_or_default();
        let title = text_of(&row, &TITLE_SELECTOR);
        let release_date = text_of(&row, &RELEASED_SELECTOR).trim().replace('\n', "");
        let image_url = first_attr(&row, &IMAGE_SELECTOR, "src").unwrap_or_default();
        let url = row.value().attr("href").unwrap_or_default();

        if [app_id, title.as_str(), release_date.as_str(), image_url.as_str(), url]
            .iter()
            .any(|field| field.is_empty())
        {
            continue;
        }

        games.push(GameResult {
            app_id: app_id.to_string(),
            title,
            release_date,
            image_url,
            url: url.to_string(),
        });
    }

    games
}

fn keep_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '!' | '?' | '-')
}

/// Removes emoji, non-Latin scripts, markup debris and every whitespace but a plain space.
pub fn clean_review_text(text: &str) -> String {
    text.chars().filter(|c| keep_char(*c)).collect()
}

/// Drops short and joke reviews and cleans the text of the rest.
pub fn filter_reviews(response: ReviewResponse) -> ReviewResponse {
    let reviews = response
        .reviews
        .into_iter()
        .filter(|r| {
            r.review.trim().split(' ').count() > MIN_REVIEW_WORDS && r.votes_funny < MAX_FUNNY_VOTES
        })
        .map(|mut r| {
            r.review = clean_review_text(&r.review);
            r
        })
        .collect();

    ReviewResponse { reviews, ..response }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Review, ReviewList};

    fn row(app_id: &str, title: &str, released: &str, img: &str, href: &str) -> String {
        let appid_attr = if app_id.is_empty() {
            String::new()
        } else {
            format!(r#"data-ds-appid="{}""#, app_id)
        };
        let href_attr = if href.is_empty() {
            String::new()
        } else {
            format!(r#"href="{}""#, href)
        };
        let img_tag = if img.is_empty() {
            "<img>".to_string()
        } else {
            format!(r#"<img src="{}">"#, img)
        };
        format!(
            r#"<a class="search_result_row" {appid_attr} {href_attr}>
                <div class="search_capsule">{img_tag}</div>
                <span class="title">{title}</span>
                <div class="search_released">
                    {released}
                </div>
            </a>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            "<html><body><div id=\"search_resultsRows\">{}</div></body></html>",
            rows.join("\n")
        )
    }

    fn review_words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_extract_reads_all_fields() {
        let html = page(&[row(
            "620",
            "Portal 2",
            "18 Apr, 2011",
            "https://cdn/620.jpg",
            "https://store/app/620",
        )]);
        let games = extract_game_list(&html);

        assert_eq!(
            games,
            vec![GameResult {
                app_id: "620".to_string(),
                title: "Portal 2".to_string(),
                release_date: "18 Apr, 2011".to_string(),
                image_url: "https://cdn/620.jpg".to_string(),
                url: "https://store/app/620".to_string(),
            }]
        );
    }

    #[test]
    fn test_extract_caps_at_ten() {
        let rows: Vec<String> = (0..25)
            .map(|i| row(&i.to_string(), &format!("Game {}", i), "2020", "img", "href"))
            .collect();
        let games = extract_game_list(&page(&rows));

        assert_eq!(games.len(), 10);
        assert_eq!(games[0].app_id, "0");
        assert_eq!(games[9].app_id, "9");
    }

    #[test]
    fn test_extract_skips_incomplete_rows() {
        let html = page(&[
            row("", "No id", "2020", "img", "href"),
            row("2", "", "2020", "img", "href"),
            row("3", "No date", "", "img", "href"),
            row("4", "No image", "2020", "", "href"),
            row("5", "No url", "2020", "img", ""),
            row("6", "Complete", "2020", "img", "href"),
        ]);
        let games = extract_game_list(&html);

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].app_id, "6");
    }

    #[test]
    fn test_extract_skipped_rows_do_not_count_toward_cap() {
        let mut rows = vec![row("", "broken", "2020", "img", "href"); 5];
        rows.extend((0..10).map(|i| row(&i.to_string(), "ok", "2020", "img", "href")));
        let games = extract_game_list(&page(&rows));

        assert_eq!(games.len(), 10);
    }

    #[test]
    fn test_extract_empty_page() {
        assert!(extract_game_list("<html></html>").is_empty());
    }

    #[test]
    fn test_filter_word_and_funny_boundaries() {
        let response = ReviewResponse {
            app_id: "1".to_string(),
            title: "T".to_string(),
            reviews: vec![
                Review::new(review_words(7), 0),
                Review::new(review_words(8), 39),
                Review::new(review_words(8), 40),
                Review::new(review_words(20), 100),
            ],
        };
        let filtered = filter_reviews(response);

        assert_eq!(filtered.reviews.len(), 1);
        assert_eq!(filtered.reviews[0].review, review_words(8));
        assert_eq!(filtered.reviews[0].votes_funny, 39);
        assert_eq!(filtered.app_id, "1");
        assert_eq!(filtered.title, "T");
    }

    #[test]
    fn test_filter_strips_disallowed_characters() {
        let text = "Great game 🎮 really fun, 10/10! Would play again? yes - définitivement <b>";
        let response = ReviewResponse {
            app_id: "1".to_string(),
            title: "T".to_string(),
            reviews: vec![Review::new(text, 0)],
        };
        let filtered = filter_reviews(response);

        assert_eq!(
            filtered.reviews[0].review,
            "Great game  really fun, 1010! Would play again? yes - dfinitivement b"
        );
    }

    #[test]
    fn test_clean_keeps_only_plain_spaces() {
        let cleaned = clean_review_text("one\ntwo\tthree\u{3000}four\u{a0}five six");
        assert_eq!(cleaned, "onetwothreefourfive six");
        assert!(cleaned
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || " ,.!?-".contains(c)));
    }

    #[test]
    fn test_multiline_review_stays_one_line() {
        let response = ReviewResponse {
            app_id: "1".to_string(),
            title: "T".to_string(),
            reviews: vec![
                Review::new("The story is great.\nThe combat is even better, honestly.", 0),
                Review::new("Second review with more than seven words in it", 0),
            ],
        };
        let list = ReviewList::from(filter_reviews(response));
        assert_eq!(list.joined_text().lines().count(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let response = ReviewResponse {
            app_id: "1".to_string(),
            title: "T".to_string(),
            reviews: vec![
                Review::new("Ça marche très bien, un jeu incroyable!!! 🙂 vraiment top", 1),
                Review::new(review_words(3), 0),
                Review::new("one two three four five six seven eight ★★★", 2),
            ],
        };
        let once = filter_reviews(response);
        let twice = filter_reviews(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_keeps_zero_reviews() {
        let response = ReviewResponse {
            app_id: "1".to_string(),
            title: "T".to_string(),
            reviews: vec![Review::new("too short", 0)],
        };
        assert!(filter_reviews(response).reviews.is_empty());
    }
}
