use std::sync::atomic::{AtomicBool, Ordering};

use super::link::share_url;
use super::types::{CreatedPaste, FormError, DEFAULT_LANGUAGE};
use crate::api::{parse_timestamp, SnippetApi, SnippetCreate};
use chrono::Local;

/// In-memory state of the creation form
#[derive(Debug)]
pub struct PasteForm {
    pub text: String,
    pub language: String,
    /// Empty means no password
    pub password: String,
    /// Empty means no expiry. Sent to the server verbatim.
    pub expiry: String,
    pub one_time: bool,
    submitting: AtomicBool,
}

impl Default for PasteForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            password: String::new(),
            expiry: String::new(),
            one_time: false,
            submitting: AtomicBool::new(false),
        }
    }
}

/// Clears the busy flag however the submit ends
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PasteForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Whether the submit affordance is enabled
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && !self.text.trim().is_empty()
    }

    pub fn payload(&self) -> SnippetCreate {
        SnippetCreate {
            plain_text: self.text.clone(),
            language: self.language.clone(),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
            expiry_time: Some(self.expiry.clone()).filter(|e| !e.is_empty()),
            one_time_view: self.one_time,
            created_at: None,
        }
    }

    /// Submit the form. At most one submit is in flight per form.
    pub async fn submit<A>(&self, api: &A, origin: &str) -> Result<CreatedPaste, FormError>
    where
        A: SnippetApi + ?Sized,
    {
        if self.text.trim().is_empty() {
            return Err(FormError::EmptyText);
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FormError::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        match api.create_snippet(&self.payload()).await {
            Ok(created) => {
                tracing::info!(slug = %created.slug, "paste created");
                Ok(CreatedPaste {
                    share_url: share_url(origin, &created.slug),
                    note: self.share_note(),
                    chars: self.char_count(),
                    slug: created.slug,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create paste");
                Err(FormError::CreateFailed)
            }
        }
    }

    /// Note shown next to the share link, strongest protection first
    pub fn share_note(&self) -> String {
        if !self.password.is_empty() {
            "Note: This paste is password protected.".to_string()
        } else if self.one_time {
            "Note: This paste will be deleted after first view.".to_string()
        } else if !self.expiry.is_empty() {
            let when = parse_timestamp(&self.expiry)
                .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| self.expiry.clone());
            format!("Note: This paste will expire on {}.", when)
        } else {
            "Note: This paste has no expiration.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, CreatedSnippet, ViewOutcome};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<SnippetCreate>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl SnippetApi for RecordingApi {
        async fn create_snippet(&self, data: &SnippetCreate) -> Result<CreatedSnippet, ApiError> {
            self.calls.lock().unwrap().push(data.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(ApiError::Status {
                    status: 502,
                    body: "upstream exploded at 10.0.0.3".to_string(),
                });
            }
            Ok(CreatedSnippet {
                slug: "s1ug".to_string(),
            })
        }

        async fn view_snippet(&self, _: &str, _: Option<&str>) -> Result<ViewOutcome, ApiError> {
            unreachable!("creation flow never views")
        }
    }

    #[tokio::test]
    async fn test_blank_options_are_omitted() {
        let api = RecordingApi::default();
        let form = PasteForm::new("print('hi')");

        let created = form.submit(&api, "http://localhost:5173").await.unwrap();
        assert_eq!(created.slug, "s1ug");
        assert_eq!(created.share_url, "http://localhost:5173/view/s1ug");
        assert_eq!(created.note, "Note: This paste has no expiration.");

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].password, None);
        assert_eq!(calls[0].expiry_time, None);
        assert_eq!(calls[0].language, "plaintext");
        assert!(!calls[0].one_time_view);
    }

    #[tokio::test]
    async fn test_set_options_are_sent_verbatim() {
        let api = RecordingApi::default();
        let form = PasteForm {
            text: "  body with spaces  ".to_string(),
            language: "python".to_string(),
            password: "s3cret".to_string(),
            expiry: "2031-05-01T10:30".to_string(),
            one_time: true,
            ..Default::default()
        };

        form.submit(&api, "https://paste.example").await.unwrap();

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].plain_text, "  body with spaces  ");
        assert_eq!(calls[0].password.as_deref(), Some("s3cret"));
        assert_eq!(calls[0].expiry_time.as_deref(), Some("2031-05-01T10:30"));
        assert!(calls[0].one_time_view);
    }

    #[tokio::test]
    async fn test_empty_text_never_hits_the_network() {
        let api = RecordingApi::default();
        for text in ["", "   ", "\n\t"] {
            let form = PasteForm::new(text);
            assert!(!form.can_submit());
            assert!(matches!(form.submit(&api, "http://o").await, Err(FormError::EmptyText)));
        }
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_generic_and_clears_busy_flag() {
        let api = RecordingApi {
            fail: true,
            ..Default::default()
        };
        let form = PasteForm::new("x");

        let err = form.submit(&api, "http://o").await.unwrap_err();
        assert!(matches!(err, FormError::CreateFailed));
        assert_eq!(err.to_string(), "Failed to create paste. Please try again.");
        assert!(!err.to_string().contains("10.0.0.3"));
        assert!(!form.is_submitting());
        assert!(form.can_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_resubmission_is_rejected() {
        let api = RecordingApi {
            delay: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        let form = PasteForm::new("x");

        let (first, second) = tokio::join!(form.submit(&api, "http://o"), async {
            tokio::task::yield_now().await;
            assert!(form.is_submitting());
            assert!(!form.can_submit());
            form.submit(&api, "http://o").await
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(FormError::Busy)));
        assert_eq!(api.calls.lock().unwrap().len(), 1);
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_share_note_priority() {
        let mut form = PasteForm::new("x");
        form.expiry = "2031-05-01T10:30".to_string();
        assert!(form.share_note().starts_with("Note: This paste will expire on 2031-05-01 10:30"));

        form.one_time = true;
        assert_eq!(form.share_note(), "Note: This paste will be deleted after first view.");

        form.password = "pw".to_string();
        assert_eq!(form.share_note(), "Note: This paste is password protected.");
    }

    #[test]
    fn test_char_count_counts_chars_not_bytes() {
        assert_eq!(PasteForm::new("héllo").char_count(), 5);
    }
}
