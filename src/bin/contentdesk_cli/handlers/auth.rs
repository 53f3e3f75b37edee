#![deny(clippy::all, clippy::pedantic)]

use crate::args::LoginArgs;
use crate::client::{CliError, Ctx};
use crate::io::read_password;
use crate::print::print_json;

pub async fn login(ctx: &Ctx, args: LoginArgs) -> Result<(), CliError> {
    let password = read_password(&args)?;
    let result = ctx
        .client
        .auth
        .login(&args.email, &password, ctx.shell())
        .await?;
    print_json(&result.user)?;
    Ok(())
}

/// Sign out on the server, then drop the local cookies even if the server call failed.
pub async fn logout(ctx: &Ctx) -> Result<(), CliError> {
    let signed_out = ctx.client.auth.logout(ctx.shell()).await;
    ctx.store.clear().await?;
    signed_out?;
    Ok(())
}

/// Run the startup profile check and print the signed-in user.
pub async fn whoami(ctx: &Ctx) -> Result<(), CliError> {
    match ctx.client.auth.probe(ctx.shell()).await {
        Some(user) => print_json(&user),
        None => Err(CliError::NotSignedIn),
    }
}
