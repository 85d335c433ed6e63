//! ig-subs
//!
//! Manage the real-time subscriptions of one Instagram application from the
//! command line. Credentials come from `ig-realtime.toml`, `--config`, or the
//! `INSTAGRAM_*` environment variables (a `.env` file is honoured).

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ig_realtime::{
    ConfigLoader, CreateSubscription, SubscriptionAspect, SubscriptionObject, Subscriptions,
    SubscriptionsResponse,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ig-subs")]
#[command(about = "Manage Instagram real-time subscriptions")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, env = "IG_REALTIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a subscription
    Create {
        /// user, tag, location or geography
        object: SubscriptionObject,

        /// Tag name or location id (tag and location subscriptions only)
        #[arg(long)]
        object_id: Option<String>,

        /// Aspect to watch
        #[arg(long, default_value = "media")]
        aspect: SubscriptionAspect,

        /// Token echoed during verification (random when omitted)
        #[arg(long)]
        verify_token: Option<String>,
    },

    /// Delete a subscription by id
    Unsubscribe {
        id: String,
    },

    /// Delete every subscription of one object kind
    Remove {
        object: SubscriptionObject,
    },

    /// Delete every subscription
    RemoveAll,

    /// List subscriptions
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for local development)
    let _ = dotenvy::dotenv();

    logging::init_logging();

    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Failed to load configuration")?;
    let subscriptions =
        Subscriptions::new(config).context("Failed to create subscriptions client")?;

    let response = run(&subscriptions, args.command).await?;

    info!(
        status = response.info.status,
        count = response.data.len(),
        rate_limit_remaining = ?response.info.rate_limit_remaining,
        "Request complete"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}

async fn run(subscriptions: &Subscriptions, command: Command) -> Result<SubscriptionsResponse> {
    let response = match command {
        Command::Create {
            object,
            object_id,
            aspect,
            verify_token,
        } => {
            let mut params = CreateSubscription::new(object, aspect);
            params.object_id = object_id;
            params.verify_token = verify_token;
            subscriptions
                .create(params)
                .await
                .context("Failed to create subscription")?
        }
        Command::Unsubscribe { id } => subscriptions
            .unsubscribe_user(&id)
            .await
            .with_context(|| format!("Failed to delete subscription {id}"))?,
        Command::Remove { object } => subscriptions
            .remove_subscription(object)
            .await
            .with_context(|| format!("Failed to delete {object} subscriptions"))?,
        Command::RemoveAll => subscriptions
            .remove_all_subscriptions()
            .await
            .context("Failed to delete subscriptions")?,
        Command::List => subscriptions
            .list_all_subscriptions()
            .await
            .context("Failed to list subscriptions")?,
    };

    Ok(response)
}
