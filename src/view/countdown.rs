use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Render the time left before expiry
pub fn format_remaining(remaining: Duration) -> String {
    if remaining.is_zero() {
        return "Expired".to_string();
    }

    let total = remaining.as_secs();
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;
    format!("Expires in {}h {}m {}s", hours, minutes, seconds)
}

/// One-shot rendering against a given wall-clock instant
pub fn countdown_text(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_remaining((expires_at - now).to_std().unwrap_or(Duration::ZERO))
}

/// Where countdown lines are published.
///
/// Every [`CountdownDisplay::clear`] starts a new epoch. Lines tagged with an
/// older epoch are dropped under the channel lock, so a countdown task that is
/// still being polled after its abort cannot bring its line back.
#[derive(Debug)]
pub struct CountdownDisplay {
    line: watch::Sender<Option<String>>,
    epoch: AtomicU64,
}

impl Default for CountdownDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownDisplay {
    pub fn new() -> Self {
        let (line, _) = watch::channel(None);
        Self {
            line,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.line.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Publish `text` if `epoch` is still current. Returns whether it was shown.
    pub fn publish(&self, epoch: u64, text: String) -> bool {
        let mut shown = false;
        self.line.send_if_modified(|line| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            shown = true;
            *line = Some(text);
            true
        });
        shown
    }

    /// Blank the line and retire every earlier epoch
    pub fn clear(&self) {
        self.line.send_if_modified(|line| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            line.take().is_some()
        });
    }
}

/// Recurring task publishing the countdown once per tick.
///
/// The wall-clock distance to expiry is measured once at start and then
/// tracked on tokio's monotonic clock. Dropping the handle stops the task.
#[derive(Debug)]
pub struct Countdown {
    task: JoinHandle<()>,
}

impl Countdown {
    pub fn start(expires_at: DateTime<Utc>, display: Arc<CountdownDisplay>) -> Self {
        let remaining = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let deadline = Instant::now() + remaining;
        let epoch = display.epoch();
        tracing::debug!(%expires_at, epoch, "countdown started");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // Keeps ticking after "Expired", matching the viewer which never
            // leaves the authorized state on its own.
            loop {
                ticker.tick().await;
                let left = deadline.saturating_duration_since(Instant::now());
                if !display.publish(epoch, format_remaining(left)) {
                    break;
                }
            }
        });

        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("countdown stopped");
    }
}
