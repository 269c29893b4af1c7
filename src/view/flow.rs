use std::sync::Arc;

use tokio::sync::watch;

use super::countdown::{Countdown, CountdownDisplay};
use super::types::{ViewErrorKind, ViewState};
use crate::api::{ApiError, SnippetApi, ViewOutcome};

/// Identifies one fetch so a late reply to a superseded fetch can be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// The viewer for one snippet identifier.
///
/// Owns the countdown task for the currently loaded snippet; the task is
/// stopped when a new fetch begins, on [`ViewFlow::teardown`], and on drop.
pub struct ViewFlow<A: ?Sized> {
    api: Arc<A>,
    slug: String,
    state: ViewState,
    generation: u64,
    countdown: Option<Countdown>,
    countdown_display: Arc<CountdownDisplay>,
}

impl<A: SnippetApi + ?Sized> ViewFlow<A> {
    pub fn new(api: Arc<A>, slug: impl Into<String>) -> Self {
        Self {
            api,
            slug: slug.into(),
            state: ViewState::Loading,
            generation: 0,
            countdown: None,
            countdown_display: Arc::new(CountdownDisplay::new()),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Follow the countdown line; `None` while nothing is counting down
    pub fn countdown(&self) -> watch::Receiver<Option<String>> {
        self.countdown_display.subscribe()
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.as_ref().is_some_and(Countdown::is_running)
    }

    /// Initial load, no password
    pub async fn open(&mut self) -> &ViewState {
        self.fetch(None).await
    }

    /// Retry with a password. There is no limit on attempts.
    pub async fn submit_password(&mut self, password: &str) -> &ViewState {
        self.fetch(Some(password)).await
    }

    async fn fetch(&mut self, password: Option<&str>) -> &ViewState {
        let ticket = self.begin_fetch();
        let result = self.api.view_snippet(&self.slug, password).await;
        self.complete_fetch(ticket, result);
        &self.state
    }

    /// Enter `Loading` and supersede whatever fetch came before
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.stop_countdown();
        self.transition(ViewState::Loading);
        FetchTicket(self.generation)
    }

    /// Apply the reply for `ticket`. Returns false if a newer fetch has begun since.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<ViewOutcome, ApiError>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                slug = %self.slug,
                stale = ticket.0,
                current = self.generation,
                "dropping stale view response"
            );
            return false;
        }

        let next = match result {
            Ok(ViewOutcome::Ok(snippet)) => {
                if let Some(expires_at) = snippet.expires_at {
                    self.countdown = Some(Countdown::start(
                        expires_at,
                        self.countdown_display.clone(),
                    ));
                }
                ViewState::Authorized(snippet)
            }
            Ok(ViewOutcome::AuthRequired) => ViewState::PasswordRequired,
            Ok(ViewOutcome::Unavailable) => ViewState::Error(ViewErrorKind::Unavailable),
            Err(e) => {
                tracing::warn!(slug = %self.slug, error = %e, "failed to fetch paste");
                ViewState::Error(ViewErrorKind::FetchFailed)
            }
        };

        self.transition(next);
        true
    }

    fn transition(&mut self, next: ViewState) {
        tracing::debug!(slug = %self.slug, from = self.state.name(), to = next.name(), "view state");
        self.state = next;
    }
}

impl<A: ?Sized> ViewFlow<A> {
    /// Release the countdown. Safe to call more than once.
    pub fn teardown(&mut self) {
        self.stop_countdown();
    }

    fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.countdown_display.clear();
    }
}

impl<A: ?Sized> Drop for ViewFlow<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
