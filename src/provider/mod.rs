//! Remote status provider integration.
//!
//! The provider exposes a JSON status API per server plus a public server
//! page whose text carries an in-game clock. [`StatusClient`] talks to both;
//! the [`StatusSource`] trait is the seam the response cache (and tests)
//! consume.

/// Short-TTL cache over the status source.
pub mod cache;
/// Resilient HTTP fetch layer.
pub mod fetcher;
/// Snapshot and wire payload definitions.
pub mod models;

use std::sync::{Arc, LazyLock};

use futures::future::BoxFuture;
use regex::Regex;
use tracing::warn;

use self::{
    fetcher::{FetchOptions, Fetcher, FetchResult},
    models::{ServerEnvelope, StatusSnapshot},
};

/// Human-readable name of the backing provider.
pub const SOURCE_NAME: &str = "BattleMetrics";

static LINK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/servers/[a-z0-9_-]+/(\d+)").expect("link pattern"));
static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("id pattern"));
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTime\s+([0-9]{1,2}:[0-9]{2})").expect("clock pattern"));

/// Extract a target id from user input: either a full provider link
/// containing `/servers/<game>/<digits>` or a bare digit string. Anything
/// else is rejected.
pub fn extract_target_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Some(captures) = LINK_ID.captures(input) {
        return Some(captures[1].to_string());
    }
    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }
    None
}

/// Pull the in-game clock out of a server page: the first `HH:MM` value
/// following a `Time` label once markup is stripped.
fn scrape_in_game_time(html: &str) -> Option<String> {
    let text = TAGS.replace_all(html, "\n");
    CLOCK
        .captures(&text)
        .map(|captures| captures[1].to_string())
}

/// Seam between the response cache and the concrete provider client.
pub trait StatusSource: Send + Sync {
    /// Fetch a fresh snapshot for `target_id`.
    fn fetch_snapshot(&self, target_id: &str) -> BoxFuture<'static, FetchResult<StatusSnapshot>>;
    /// Fetch the provider-reported display name for `target_id`.
    fn fetch_name(&self, target_id: &str) -> BoxFuture<'static, FetchResult<Option<String>>>;
}

/// Client for the provider's status API and public server pages.
#[derive(Clone)]
pub struct StatusClient {
    fetcher: Fetcher,
    api_base: Arc<str>,
    page_base: Arc<str>,
    game: Arc<str>,
    options: FetchOptions,
}

impl StatusClient {
    /// Build a client against the given API and page base URLs.
    pub fn new(fetcher: Fetcher, api_base: &str, page_base: &str, game: &str) -> Self {
        Self {
            fetcher,
            api_base: Arc::from(api_base.trim_end_matches('/')),
            page_base: Arc::from(page_base.trim_end_matches('/')),
            game: Arc::from(game),
            options: FetchOptions::default(),
        }
    }

    fn server_url(&self, target_id: &str) -> String {
        format!("{}/servers/{target_id}", self.api_base)
    }

    fn page_url(&self, target_id: &str) -> String {
        format!("{}/servers/{}/{target_id}", self.page_base, self.game)
    }

    /// Fetch the status payload and fold it into a snapshot. The page scrape
    /// for the in-game clock is best effort and never fails the snapshot.
    async fn snapshot(&self, target_id: &str) -> FetchResult<StatusSnapshot> {
        let payload: ServerEnvelope = self
            .fetcher
            .get_json(&self.server_url(target_id), &self.options)
            .await?;
        let attributes = payload.data.attributes;

        let name = attributes
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Server {target_id}"));
        let online = attributes
            .status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("online"));
        let endpoint = attributes
            .ip
            .zip(attributes.port)
            .map(|(ip, port)| format!("{ip}:{port}"));
        let in_game_time = self.in_game_time(target_id).await;

        Ok(StatusSnapshot {
            target_id: target_id.to_string(),
            online,
            name,
            players: attributes.players,
            max_players: attributes.max_players,
            endpoint,
            in_game_time,
            source: SOURCE_NAME.to_string(),
            error: None,
        })
    }

    async fn in_game_time(&self, target_id: &str) -> Option<String> {
        match self
            .fetcher
            .get_text(&self.page_url(target_id), &self.options)
            .await
        {
            Ok(html) => scrape_in_game_time(&html),
            Err(err) => {
                warn!(target_id, error = %err, "in-game clock scrape failed");
                None
            }
        }
    }
}

impl StatusSource for StatusClient {
    fn fetch_snapshot(&self, target_id: &str) -> BoxFuture<'static, FetchResult<StatusSnapshot>> {
        let client = self.clone();
        let target_id = target_id.to_string();
        Box::pin(async move { client.snapshot(&target_id).await })
    }

    fn fetch_name(&self, target_id: &str) -> BoxFuture<'static, FetchResult<Option<String>>> {
        let client = self.clone();
        let target_id = target_id.to_string();
        Box::pin(async move {
            let payload: ServerEnvelope = client
                .fetcher
                .get_json(&client.server_url(&target_id), &client.options)
                .await?;
            Ok(payload
                .data
                .attributes
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_full_link() {
        assert_eq!(
            extract_target_id("https://www.battlemetrics.com/servers/dayz/1234567").as_deref(),
            Some("1234567")
        );
        assert_eq!(
            extract_target_id("https://example.org/servers/rust/42?tab=players").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn extracts_bare_numeric_id() {
        assert_eq!(extract_target_id("987654").as_deref(), Some("987654"));
        assert_eq!(extract_target_id("  987654  ").as_deref(), Some("987654"));
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(extract_target_id(""), None);
        assert_eq!(extract_target_id("   "), None);
        assert_eq!(extract_target_id("not-a-link"), None);
        assert_eq!(extract_target_id("12a34"), None);
        assert_eq!(extract_target_id("https://example.org/players/1234"), None);
    }

    #[test]
    fn scrapes_clock_following_time_label() {
        let html = "<dl><dt>Time</dt><dd>08:45</dd><dt>Rank</dt><dd>12:99</dd></dl>";
        assert_eq!(scrape_in_game_time(html).as_deref(), Some("08:45"));
    }

    #[test]
    fn scrape_ignores_pages_without_a_clock() {
        assert_eq!(scrape_in_game_time("<p>Uptime 12:30</p>"), None);
        assert_eq!(scrape_in_game_time("<p>Time soon</p>"), None);
    }
}
