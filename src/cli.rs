use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::WarnLevel;
use tokio::io::AsyncReadExt;

use crate::commands::{self, AppState, CommandError, CreateRequest};
use crate::paste::DEFAULT_LANGUAGE;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "codepaste", version, about = "Share code snippets through CodePaste", long_about = None)]
pub struct Cli {
    /// Snippet API base URL, e.g. https://paste.example/api/snippets/
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Origin used when building share links
    #[arg(long, global = true, value_name = "URL")]
    pub origin: Option<String>,

    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a paste from a file or stdin and print its share link
    Create {
        /// File to paste; reads stdin when omitted
        file: Option<PathBuf>,
        /// Syntax highlighting language (see `codepaste languages`)
        #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
        language: String,
        /// Protect the paste with a password
        #[arg(short, long)]
        password: Option<String>,
        /// Expiry moment, e.g. 2025-06-01T12:00
        #[arg(short, long, value_name = "DATETIME")]
        expires: Option<String>,
        /// Delete the paste after it is viewed once
        #[arg(long)]
        one_time: bool,
        /// Copy the share link to the clipboard
        #[arg(long)]
        copy_link: bool,
    },
    /// Show a paste by share link or identifier
    View {
        /// Share link or bare identifier
        source: String,
        /// Password for a protected paste; prompted for when needed
        #[arg(short, long)]
        password: Option<String>,
        /// Copy the content to the clipboard
        #[arg(long)]
        copy: bool,
        /// Save the content as <identifier>.<language> in this directory.
        /// Refuses to overwrite an existing file.
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
        /// Keep printing the expiry countdown until Ctrl-C
        #[arg(short, long)]
        watch: bool,
    },
    /// List the languages offered for syntax highlighting
    Languages,
    /// Inspect or create the settings file
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print the effective settings
    Show,
    /// Write a settings file with the defaults
    Init {
        /// Where to write it; defaults to the user config directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

impl Cli {
    fn settings(&self) -> Result<Settings, CommandError> {
        let mut settings = Settings::load()?;
        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(origin) = &self.origin {
            settings.share_origin = Some(origin.clone());
        }
        Ok(settings)
    }

    pub async fn execute(self) -> Result<(), CommandError> {
        let settings = self.settings()?;

        match self.cmd {
            Commands::Create {
                file,
                language,
                password,
                expires,
                one_time,
                copy_link,
            } => {
                let text = match file {
                    Some(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                        CommandError::new(format!("Failed to read {}: {}", path.display(), e))
                    })?,
                    None => {
                        let mut text = String::new();
                        tokio::io::stdin().read_to_string(&mut text).await?;
                        text
                    }
                };

                let state = AppState::new(settings)?;
                let created = commands::create_paste(
                    &state,
                    CreateRequest {
                        text,
                        language: Some(language),
                        password,
                        expiry: expires,
                        one_time,
                    },
                )
                .await?;

                println!("{}", created.share_url);
                eprintln!("{} characters", created.chars);
                if !created.note.is_empty() {
                    eprintln!("{}", created.note);
                }
                if copy_link {
                    match commands::copy_share_link(&created) {
                        Ok(()) => eprintln!("Link copied to clipboard."),
                        Err(e) => eprintln!("Could not copy link: {}", e),
                    }
                }
            }
            Commands::View {
                source,
                password,
                copy,
                download,
                watch,
            } => {
                let state = AppState::new(settings)?;
                let mut flow = commands::open_paste(&state, &source, password, |message| async move {
                    tokio::task::spawn_blocking(move || read_password(message))
                        .await
                        .ok()
                        .flatten()
                })
                .await?;

                let snippet = flow
                    .state()
                    .snippet()
                    .cloned()
                    .ok_or_else(|| CommandError::new(crate::view::FETCH_FAILED_MESSAGE))?;

                let header = commands::render_header(&snippet, Utc::now());
                if !header.is_empty() {
                    eprintln!("{}", header);
                }
                print!("{}", snippet.content);
                if !snippet.content.ends_with('\n') {
                    println!();
                }

                if copy {
                    commands::copy_paste(&snippet)?;
                    eprintln!("Copied!");
                }
                if let Some(dir) = download {
                    let path = commands::download_paste(&snippet, &dir)?;
                    eprintln!("Saved {}", path.display());
                }

                if watch && flow.countdown_active() {
                    let shutdown = async {
                        let _ = tokio::signal::ctrl_c().await;
                    };
                    commands::watch_countdown(&mut flow, shutdown, |line| {
                        eprint!("\r\x1b[2K{}", line);
                        let _ = std::io::stderr().flush();
                    })
                    .await;
                    eprintln!();
                }
                flow.teardown();
            }
            Commands::Languages => {
                for language in commands::list_languages() {
                    println!("{:<12} {}", language.value, language.label);
                }
            }
            Commands::Config { cmd } => match cmd {
                ConfigCmd::Show => {
                    print!("{}", commands::show_config(&settings)?);
                }
                ConfigCmd::Init { path } => {
                    let path = match path {
                        Some(path) => path,
                        None => Settings::default_path()?,
                    };
                    if commands::init_config(&path)? {
                        println!("Wrote {}", path.display());
                    } else {
                        println!("{} already exists", path.display());
                    }
                }
            },
        }

        Ok(())
    }
}

/// Ask on the terminal without echoing; `None` on empty input or a failed prompt
fn read_password(message: &str) -> Option<String> {
    eprintln!("{}", message);
    accepted_password(
        dialoguer::Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact(),
    )
}

fn accepted_password<E: std::fmt::Display>(answer: Result<String, E>) -> Option<String> {
    match answer {
        Ok(password) if !password.is_empty() => Some(password),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "password prompt aborted");
            None
        }
    }
}
