use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::api::{ApiError, HttpSnippetClient, Snippet, SnippetApi};
use crate::clipboard::{write_clipboard, ClipboardError};
use crate::paste::{
    language_label, slug_from_source, CreatedPaste, FormError, LanguageOption, PasteForm,
    LANGUAGES,
};
use crate::settings::{ConfigError, Settings};
use crate::view::{self, countdown_text, ActionError, ViewFlow, ViewState, PASSWORD_PROMPT};

pub struct AppState {
    pub settings: Settings,
    pub api: Arc<dyn SnippetApi>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, CommandError> {
        let client = HttpSnippetClient::new(&settings.api_base_url, settings.request_timeout())?;
        tracing::debug!(base_url = %client.base_url(), "snippet API configured");
        Ok(Self {
            settings,
            api: Arc::new(client),
        })
    }

    pub fn with_api(settings: Settings, api: Arc<dyn SnippetApi>) -> Self {
        Self { settings, api }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<FormError> for CommandError {
    fn from(e: FormError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<ActionError> for CommandError {
    fn from(e: ActionError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<ClipboardError> for CommandError {
    fn from(e: ClipboardError) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        CommandError {
            message: e.to_string(),
        }
    }
}

// Creation commands

#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub text: String,
    pub language: Option<String>,
    pub password: Option<String>,
    pub expiry: Option<String>,
    pub one_time: bool,
}

pub async fn create_paste(
    state: &AppState,
    request: CreateRequest,
) -> Result<CreatedPaste, CommandError> {
    let mut form = PasteForm::new(request.text);
    if let Some(language) = request.language.filter(|l| !l.trim().is_empty()) {
        form.language = language;
    }
    form.password = request.password.unwrap_or_default();
    form.expiry = request.expiry.unwrap_or_default();
    form.one_time = request.one_time;

    tracing::info!(
        chars = form.char_count(),
        language = %form.language,
        known_language = language_label(&form.language).is_some(),
        "submitting paste"
    );

    let created = form.submit(state.api.as_ref(), &state.settings.share_origin()).await?;
    Ok(created)
}

pub fn copy_share_link(created: &CreatedPaste) -> Result<(), CommandError> {
    write_clipboard(&created.share_url)?;
    Ok(())
}

pub fn list_languages() -> Vec<LanguageOption> {
    LANGUAGES.to_vec()
}

// Viewer commands

/// Open the paste behind `source` (share link or bare identifier).
///
/// While the server asks for a password, `prompt` is asked for one; the loop
/// has no attempt limit and ends when the prompt yields nothing.
pub async fn open_paste<F, Fut>(
    state: &AppState,
    source: &str,
    password: Option<String>,
    mut prompt: F,
) -> Result<ViewFlow<dyn SnippetApi>, CommandError>
where
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let slug = slug_from_source(source).ok_or_else(|| {
        CommandError::new(format!("Could not find a paste identifier in '{}'.", source))
    })?;

    let mut flow: ViewFlow<dyn SnippetApi> = ViewFlow::new(state.api.clone(), slug);
    match password.filter(|p| !p.is_empty()) {
        Some(password) => flow.submit_password(&password).await,
        None => flow.open().await,
    };

    loop {
        match flow.state() {
            ViewState::Authorized(_) => break,
            ViewState::Error(kind) => return Err(CommandError::new(kind.message())),
            ViewState::Loading => return Err(CommandError::new(view::FETCH_FAILED_MESSAGE)),
            ViewState::PasswordRequired => {}
        }

        let Some(password) = prompt(PASSWORD_PROMPT).await.filter(|p| !p.is_empty()) else {
            return Err(CommandError::new(PASSWORD_PROMPT));
        };
        flow.submit_password(&password).await;
    }

    Ok(flow)
}

pub fn copy_paste(snippet: &Snippet) -> Result<(), CommandError> {
    view::copy(snippet)?;
    Ok(())
}

pub fn download_paste(snippet: &Snippet, dir: &Path) -> Result<PathBuf, CommandError> {
    Ok(view::download(snippet, dir)?)
}

/// Forward every countdown line to `on_line` until `shutdown` resolves or the
/// flow stops counting down. Tears the flow down before returning.
pub async fn watch_countdown<A, S, F>(flow: &mut ViewFlow<A>, shutdown: S, mut on_line: F)
where
    A: SnippetApi + ?Sized,
    S: Future<Output = ()>,
    F: FnMut(&str),
{
    let mut display = flow.countdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = display.borrow_and_update().clone();
                match line {
                    Some(line) => on_line(&line),
                    None => break,
                }
            }
        }
    }

    flow.teardown();
}

/// Metadata block shown above the snippet body
pub fn render_header(snippet: &Snippet, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();

    if let Some(created_at) = snippet.created_at {
        lines.push(format!(
            "Created at: {}",
            created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ));
    }

    let mut badges = Vec::new();
    if let Some(language) = &snippet.language {
        badges.push(format!("[{}]", language));
    }
    if snippet.one_time_view {
        badges.push("[One-time view]".to_string());
    }
    if let Some(expires_at) = snippet.expires_at {
        badges.push(countdown_text(expires_at, now));
    }
    if !badges.is_empty() {
        lines.push(badges.join(" "));
    }

    lines.join("\n")
}

// Config commands

pub fn show_config(settings: &Settings) -> Result<String, CommandError> {
    Ok(settings.to_toml()?)
}

pub fn init_config(path: &Path) -> Result<bool, CommandError> {
    Ok(Settings::write_default(path)?)
}
