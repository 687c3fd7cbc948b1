//! Auth-url command - prints where `/auth` would redirect.

use anyhow::Result;
use clap::Args;
use fitrelay_oauth::build_authorization_url;

use super::Context;

/// Arguments for the auth-url command.
#[derive(Args, Debug)]
pub struct AuthUrlArgs {}

/// Run the auth-url command.
pub async fn run(_args: AuthUrlArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    println!("{}", build_authorization_url(&config));
    Ok(())
}
