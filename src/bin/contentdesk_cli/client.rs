#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use contentdesk::{
    application::{
        client::{AdminClient, SessionStore},
        error::AppError,
        shell::Shell,
    },
    config::{self, LoadError, Settings},
    domain::error::DomainError,
    infra::{
        error::InfraError,
        http::{ApiError, HttpTransport},
    },
};
use thiserror::Error;
use tracing::debug;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("not signed in; run `contentdesk-cli login` first")]
    NotSignedIn,
    #[error("password is required (use --password-file or CONTENTDESK_PASSWORD)")]
    MissingPassword,
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::App(err.into())
    }
}

impl From<InfraError> for CliError {
    fn from(err: InfraError) -> Self {
        Self::App(err.into())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self::App(err.into())
    }
}

impl From<DomainError> for CliError {
    fn from(err: DomainError) -> Self {
        Self::App(err.into())
    }
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::App(err) => u8::try_from(err.exit_code()).unwrap_or(1),
            Self::MissingPassword | Self::InputFile { .. } | Self::InvalidInput(_) => 2,
            Self::NotSignedIn => 3,
            Self::Output(_) => 1,
        }
    }
}

/// Shell for a terminal: messages go to stderr, questions are answered by `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleShell {
    pub assume_yes: bool,
}

impl Shell for ConsoleShell {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&self, question: &str) -> bool {
        if !self.assume_yes {
            eprintln!("{question} (re-run with --yes to confirm)");
        }
        self.assume_yes
    }

    fn navigate(&self, route: &str) {
        debug!(route, "navigate");
    }
}

pub struct Ctx {
    pub settings: Settings,
    pub client: AdminClient,
    pub transport: HttpTransport,
    pub store: SessionStore,
    pub shell: Arc<ConsoleShell>,
}

impl Ctx {
    pub fn shell(&self) -> &dyn Shell {
        self.shell.as_ref()
    }

    /// Keep whatever cookies the server set during this run.
    pub async fn persist_session(&self) -> Result<(), CliError> {
        self.store.save(&self.transport).await?;
        Ok(())
    }
}

pub fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    Ok(config::load(&cli.config)?)
}

pub async fn build_ctx(cli: &Cli, settings: Settings) -> Result<Ctx, CliError> {
    let shell = Arc::new(ConsoleShell {
        assume_yes: cli.yes,
    });
    let (client, transport) = AdminClient::connect(&settings.api, shell.clone())?;
    let store = SessionStore::new(settings.session.file.clone());
    if store.restore(&transport).await? {
        debug!(path = %store.path().display(), "session restored");
    }
    Ok(Ctx {
        settings,
        client,
        transport,
        store,
        shell,
    })
}
