//! # Instagram real-time subscriptions SDK
//!
//! Client for the subscription endpoints of the Instagram real-time API:
//! create, delete by id, delete by object kind, delete all, and list.
//!
//! ## Features
//!
//! - **Subscriptions**: one typed call per endpoint, each a single request/response
//! - **Configuration**: builder, TOML file and environment overrides
//! - **Callbacks**: challenge handshake and `X-Hub-Signature` validation for the
//!   subscriber's callback endpoint
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ig_realtime::{Config, CreateSubscription, SubscriptionAspect, SubscriptionObject, Subscriptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("client_id", "client_secret", "https://example.com/callback");
//!     let subscriptions = Subscriptions::new(config)?;
//!
//!     let created = subscriptions
//!         .create(
//!             CreateSubscription::new(SubscriptionObject::Tag, SubscriptionAspect::Media)
//!                 .object_id("nofilter"),
//!         )
//!         .await?;
//!     println!("Created {:?}", created.data);
//!
//!     let all = subscriptions.list_all_subscriptions().await?;
//!     println!("Found {} subscriptions", all.data.len());
//!
//!     Ok(())
//! }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod subscription;

// Re-export main types
pub use client::{ApiClient, ApiRequest, ApiResponse};
pub use config::Config;
pub use error::{Error, Result};
pub use loader::ConfigLoader;
pub use models::{
    Meta, ResponseInfo, Subscription, SubscriptionAspect, SubscriptionObject,
    SubscriptionsResponse,
};
pub use subscription::{CreateSubscription, Subscriptions};
