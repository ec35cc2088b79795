//! Shared fakes and fixtures for unit tests.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use tempfile::TempDir;

use crate::{
    config::{AppConfig, DisplayConfig},
    display::{DisplayContent, DisplayError, DisplayGateway, DisplayResult, MessageHandle},
    provider::{
        StatusSource,
        fetcher::{FetchError, FetchResult},
        models::StatusSnapshot,
    },
    state::{AppState, SharedState},
};

/// Assemble a shared state over a temporary data directory.
pub async fn test_state(source: Arc<FakeSource>) -> (SharedState, TempDir) {
    test_state_with_interval(source, Duration::from_secs(60)).await
}

/// Assemble a shared state with an explicit poll interval.
pub async fn test_state_with_interval(
    source: Arc<FakeSource>,
    poll_interval: Duration,
) -> (SharedState, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let config = AppConfig {
        port: 0,
        data_dir: dir.path().to_path_buf(),
        poll_interval,
        provider_api_url: "http://provider.invalid".into(),
        provider_page_url: "http://provider-page.invalid".into(),
        provider_game: "dayz".into(),
        admin_token: None,
        display: DisplayConfig::default(),
    };
    let state = AppState::initialise(config, source).await;
    (state, dir)
}

/// Status source returning canned snapshots and counting calls.
pub struct FakeSource {
    online: bool,
    snapshot_fetches: AtomicUsize,
}

impl FakeSource {
    /// Source whose targets are always online.
    pub fn online() -> Arc<Self> {
        Arc::new(Self {
            online: true,
            snapshot_fetches: AtomicUsize::new(0),
        })
    }

    /// Source whose fetches always fail.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            online: false,
            snapshot_fetches: AtomicUsize::new(0),
        })
    }

    /// Number of snapshot fetches issued so far.
    pub fn snapshot_fetches(&self) -> usize {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }

    fn error(target_id: &str) -> FetchError {
        FetchError::Status {
            url: format!("http://provider.invalid/servers/{target_id}"),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "down".into(),
        }
    }
}

impl StatusSource for FakeSource {
    fn fetch_snapshot(&self, target_id: &str) -> BoxFuture<'static, FetchResult<StatusSnapshot>> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);
        let online = self.online;
        let target_id = target_id.to_string();
        Box::pin(async move {
            if !online {
                return Err(Self::error(&target_id));
            }
            Ok(StatusSnapshot {
                target_id: target_id.clone(),
                online: true,
                name: format!("Fake Server {target_id}"),
                players: Some(3),
                max_players: Some(60),
                endpoint: Some("198.51.100.7:2302".into()),
                in_game_time: Some("08:45".into()),
                source: crate::provider::SOURCE_NAME.to_string(),
                error: None,
            })
        })
    }

    fn fetch_name(&self, target_id: &str) -> BoxFuture<'static, FetchResult<Option<String>>> {
        let online = self.online;
        let target_id = target_id.to_string();
        Box::pin(async move {
            if !online {
                return Err(Self::error(&target_id));
            }
            Ok(Some(format!("Fake Server {target_id}")))
        })
    }
}

/// Display gateway recording every call, with scriptable one-shot failures.
pub struct FakeGateway {
    /// Content of every created message, in order.
    pub created: Mutex<Vec<DisplayContent>>,
    /// Handle and content of every edit, in order.
    pub edited: Mutex<Vec<(MessageHandle, DisplayContent)>>,
    next_handle: AtomicU64,
    next_edit_error: Mutex<Option<DisplayError>>,
    next_create_error: Mutex<Option<DisplayError>>,
}

impl FakeGateway {
    /// Build a gateway and install it on the state.
    pub async fn install(state: &SharedState) -> Arc<Self> {
        let gateway = Arc::new(Self {
            created: Mutex::new(Vec::new()),
            edited: Mutex::new(Vec::new()),
            next_handle: AtomicU64::new(1),
            next_edit_error: Mutex::new(None),
            next_create_error: Mutex::new(None),
        });
        state.install_display(gateway.clone()).await;
        gateway
    }

    /// Fail the next edit with the given error, once.
    pub fn fail_next_edit(&self, error: DisplayError) {
        *self.next_edit_error.lock().unwrap() = Some(error);
    }

    /// Fail the next create with the given error, once.
    pub fn fail_next_create(&self, error: DisplayError) {
        *self.next_create_error.lock().unwrap() = Some(error);
    }
}

impl DisplayGateway for FakeGateway {
    fn create_message(
        &self,
        content: DisplayContent,
    ) -> BoxFuture<'static, DisplayResult<MessageHandle>> {
        let scripted = self.next_create_error.lock().unwrap().take();
        let handle = match scripted {
            Some(error) => Err(error),
            None => {
                self.created.lock().unwrap().push(content);
                let id = self.next_handle.fetch_add(1, Ordering::SeqCst);
                Ok(format!("m-{id}"))
            }
        };
        Box::pin(async move { handle })
    }

    fn edit_message(
        &self,
        handle: MessageHandle,
        content: DisplayContent,
    ) -> BoxFuture<'static, DisplayResult<()>> {
        let scripted = self.next_edit_error.lock().unwrap().take();
        let result = match scripted {
            Some(error) => Err(error),
            None => {
                self.edited.lock().unwrap().push((handle, content));
                Ok(())
            }
        };
        Box::pin(async move { result })
    }

    fn fetch_message(&self, _handle: MessageHandle) -> BoxFuture<'static, DisplayResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
