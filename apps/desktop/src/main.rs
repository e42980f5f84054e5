use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{spawn_controller, FormInput, HttpEnrichmentClient, LocalSessionProvider};
use shared::domain::Identity;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod input;
mod repl;
mod view;

#[derive(Parser, Debug)]
#[command(name = "lead-enrich", about = "Enrich a sales lead from a company name and website")]
struct Args {
    /// Base URL of the enrichment service.
    #[arg(long, env = "ENRICH_ENDPOINT", default_value = "http://127.0.0.1:5000")]
    endpoint: String,
    /// Display name of the local user to sign in as.
    #[arg(long, env = "ENRICH_USER", default_value = "local-user")]
    user: String,
    #[arg(long, env = "ENRICH_EMAIL")]
    email: Option<String>,
    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Sign in, enrich one lead, print the result and exit.
    Enrich {
        #[arg(long)]
        company: String,
        #[arg(long)]
        website: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let enricher = HttpEnrichmentClient::from_base_url(&args.endpoint)
        .with_context(|| format!("invalid enrichment endpoint '{}'", args.endpoint))?;
    info!(endpoint = %enricher.endpoint(), "using enrichment service");

    let mut identity = Identity::new(args.user.clone()).with_display_name(args.user.clone());
    if let Some(email) = args.email.clone() {
        identity = identity.with_email(email);
    }
    let session = Arc::new(LocalSessionProvider::new(identity));
    let (handle, _controller) = spawn_controller(session, Arc::new(enricher));

    match args.command {
        None => repl::run(&handle, BufReader::new(stdin()), stdout()).await,
        Some(Mode::Enrich { company, website }) => {
            let form = FormInput::new(company, website);
            input::validate_form(&form)?;

            let state = repl::dispatch_and_settle(
                &handle,
                |handle| handle.login(),
                |state| state.is_signed_in() || state.login_error.is_some(),
            )
            .await?;
            if let Some(message) = state.login_error {
                bail!(message);
            }

            let state = repl::submit_and_settle(&handle, &form).await?;
            println!("{}", view::render(&state));
            if let Some(message) = state.submit_error {
                bail!(message);
            }
            Ok(())
        }
    }
}
