//! contentdesk-cli: command-line front end for the content admin API.
//! Each run restores the stored session cookies and writes them back afterwards.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;

use std::process::ExitCode;

use clap::Parser;
use contentdesk::infra::telemetry;
use tracing::warn;

use args::{Cli, Commands};
use client::{CliError, Ctx, build_ctx, load_settings};
use handlers::{auth, company, contacts, content};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    telemetry::init(&settings.logging)?;
    let ctx = build_ctx(&cli, settings).await?;

    let keep_session = !matches!(cli.command, Commands::Logout);
    let outcome = dispatch(&ctx, cli.command).await;

    if keep_session && let Err(err) = ctx.persist_session().await {
        warn!(error = %err, "failed to store session cookies");
    }
    outcome
}

async fn dispatch(ctx: &Ctx, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login(args) => auth::login(ctx, args).await,
        Commands::Logout => auth::logout(ctx).await,
        Commands::Whoami => auth::whoami(ctx).await,
        Commands::Promotions(cmd) => content::handle(ctx, &ctx.client.promotions, cmd.action).await,
        Commands::Heroes(cmd) => content::handle(ctx, &ctx.client.heroes, cmd.action).await,
        Commands::Games(cmd) => content::handle(ctx, &ctx.client.games, cmd.action).await,
        Commands::News(cmd) => content::handle(ctx, &ctx.client.news, cmd.action).await,
        Commands::Company(cmd) => company::handle(ctx, cmd.action).await,
        Commands::Contacts(cmd) => contacts::handle(ctx, cmd.action).await,
    }
}
