pub mod api;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod paste;
pub mod settings;
pub mod view;

use tracing_subscriber::EnvFilter;

pub use cli::Cli;
pub use commands::CommandError;

/// Log to stderr. `RUST_LOG` wins over the `-v`/`-q` flags.
pub fn init_tracing(verbosity: &clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>) {
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run(cli: Cli) -> Result<(), CommandError> {
    init_tracing(&cli.verbosity);
    cli.execute().await
}
