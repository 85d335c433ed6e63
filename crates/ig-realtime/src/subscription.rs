//! Subscription management against the real-time API

use crate::client::{ApiClient, ApiRequest};
use crate::config::Config;
use crate::error::Result;
use crate::models::{SubscriptionAspect, SubscriptionObject, SubscriptionsResponse};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Parameters of a create call
///
/// `object_id` is needed for [`SubscriptionObject::Tag`] and
/// [`SubscriptionObject::Location`] and ignored for the other kinds. A blank or
/// missing verify token is replaced by a fresh UUID when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSubscription {
    pub object: SubscriptionObject,
    pub aspect: SubscriptionAspect,
    pub object_id: Option<String>,
    pub verify_token: Option<String>,
}

impl CreateSubscription {
    pub fn new(object: SubscriptionObject, aspect: SubscriptionAspect) -> Self {
        Self {
            object,
            aspect,
            object_id: None,
            verify_token: None,
        }
    }

    /// Set the watched object's identifier (tag name, location id)
    pub fn object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    /// Set the token echoed back during the verification handshake
    pub fn verify_token(mut self, verify_token: impl Into<String>) -> Self {
        self.verify_token = Some(verify_token.into());
        self
    }
}

/// Manages subscriptions for one application
///
/// Holds the application's configuration and a single HTTP client for its
/// whole lifetime. Clones share both.
#[derive(Debug, Clone)]
pub struct Subscriptions {
    config: Arc<Config>,
    client: ApiClient,
}

impl Subscriptions {
    /// Create a manager and its HTTP client
    pub fn new(config: Config) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        debug!(realtime_api = %client.base_url(), "Subscriptions client ready");

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create a subscription
    pub async fn create(&self, params: CreateSubscription) -> Result<SubscriptionsResponse> {
        let request = self.create_request(params);
        self.client.execute(request).await
    }

    /// Delete a subscription by its id
    pub async fn unsubscribe_user(&self, id: &str) -> Result<SubscriptionsResponse> {
        self.client.execute(self.unsubscribe_user_request(id)).await
    }

    /// Delete every subscription of one object kind
    pub async fn remove_subscription(
        &self,
        object: SubscriptionObject,
    ) -> Result<SubscriptionsResponse> {
        self.client
            .execute(self.remove_subscription_request(object))
            .await
    }

    /// Delete every subscription of the application
    pub async fn remove_all_subscriptions(&self) -> Result<SubscriptionsResponse> {
        self.client
            .execute(self.remove_all_subscriptions_request())
            .await
    }

    /// List the application's subscriptions
    pub async fn list_all_subscriptions(&self) -> Result<SubscriptionsResponse> {
        self.client
            .execute(self.list_all_subscriptions_request())
            .await
    }

    pub fn create_request(&self, params: CreateSubscription) -> ApiRequest {
        let verify_token = match params.verify_token {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                let token = Uuid::new_v4().to_string();
                debug!("Generated verify token");
                token
            }
        };

        let request = self
            .credentials(ApiRequest::post())
            .param("object", params.object.as_str())
            .param("aspect", params.aspect.as_str())
            .param("verify_token", verify_token)
            .param("callback_url", self.config.callback_url.as_str());

        // User and geography subscriptions never carry an object id
        match params.object_id {
            Some(object_id) if params.object.takes_object_id() => {
                request.param("object_id", object_id.to_lowercase())
            }
            _ => request,
        }
    }

    pub fn unsubscribe_user_request(&self, id: &str) -> ApiRequest {
        self.credentials(ApiRequest::delete()).param("id", id)
    }

    pub fn remove_subscription_request(&self, object: SubscriptionObject) -> ApiRequest {
        self.credentials(ApiRequest::delete())
            .param("object", object.as_str())
    }

    pub fn remove_all_subscriptions_request(&self) -> ApiRequest {
        self.credentials(ApiRequest::delete()).param("object", "all")
    }

    pub fn list_all_subscriptions_request(&self) -> ApiRequest {
        self.credentials(ApiRequest::get())
    }

    fn credentials(&self, request: ApiRequest) -> ApiRequest {
        request
            .param("client_id", self.config.client_id.as_str())
            .param("client_secret", self.config.client_secret.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn manager() -> Subscriptions {
        Subscriptions::new(Config::new("my-id", "my-secret", "https://example.com/cb")).unwrap()
    }

    fn names(request: &ApiRequest) -> Vec<&'static str> {
        request.params().iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_create_tag_includes_lowercased_object_id() {
        let request = manager().create_request(
            CreateSubscription::new(SubscriptionObject::Tag, SubscriptionAspect::Media)
                .object_id("NoFilter"),
        );

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            names(&request),
            vec![
                "client_id",
                "client_secret",
                "object",
                "aspect",
                "verify_token",
                "callback_url",
                "object_id",
            ]
        );
        assert_eq!(request.get_param("client_id"), Some("my-id"));
        assert_eq!(request.get_param("client_secret"), Some("my-secret"));
        assert_eq!(request.get_param("object"), Some("tag"));
        assert_eq!(request.get_param("aspect"), Some("media"));
        assert_eq!(request.get_param("callback_url"), Some("https://example.com/cb"));
        assert_eq!(request.get_param("object_id"), Some("nofilter"));
    }

    #[test]
    fn test_create_location_includes_object_id() {
        let request = manager().create_request(
            CreateSubscription::new(SubscriptionObject::Location, SubscriptionAspect::Media)
                .object_id("1257285"),
        );

        assert_eq!(request.get_param("object"), Some("location"));
        assert_eq!(request.get_param("object_id"), Some("1257285"));
    }

    #[test]
    fn test_create_user_and_geography_drop_object_id() {
        for object in [SubscriptionObject::User, SubscriptionObject::Geography] {
            let request = manager().create_request(
                CreateSubscription::new(object, SubscriptionAspect::Media).object_id("ignored"),
            );

            assert_eq!(request.get_param("object"), Some(object.as_str()));
            assert_eq!(request.get_param("object_id"), None);
        }
    }

    #[test]
    fn test_create_tag_without_object_id_omits_it() {
        let request = manager().create_request(CreateSubscription::new(
            SubscriptionObject::Tag,
            SubscriptionAspect::Media,
        ));

        assert_eq!(request.get_param("object_id"), None);
    }

    #[test]
    fn test_generated_verify_tokens_are_unique() {
        let manager = manager();
        let params = CreateSubscription::new(SubscriptionObject::User, SubscriptionAspect::Media);

        let first = manager.create_request(params.clone());
        let second = manager.create_request(params);

        let first = first.get_param("verify_token").unwrap().to_string();
        let second = second.get_param("verify_token").unwrap().to_string();
        assert!(!first.is_empty());
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn test_blank_verify_token_is_replaced() {
        let request = manager().create_request(
            CreateSubscription::new(SubscriptionObject::User, SubscriptionAspect::Media)
                .verify_token("   "),
        );

        let token = request.get_param("verify_token").unwrap();
        assert!(Uuid::parse_str(token).is_ok());
    }

    #[test]
    fn test_explicit_verify_token_used_verbatim() {
        let request = manager().create_request(
            CreateSubscription::new(SubscriptionObject::User, SubscriptionAspect::Media)
                .verify_token("My-Token"),
        );

        assert_eq!(request.get_param("verify_token"), Some("My-Token"));
    }

    #[test]
    fn test_unsubscribe_user_request() {
        let request = manager().unsubscribe_user_request("1234");

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(names(&request), vec!["client_id", "client_secret", "id"]);
        assert_eq!(request.get_param("id"), Some("1234"));
    }

    #[test]
    fn test_remove_subscription_request() {
        let request = manager().remove_subscription_request(SubscriptionObject::User);

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(names(&request), vec!["client_id", "client_secret", "object"]);
        assert_eq!(request.get_param("object"), Some("user"));
    }

    #[test]
    fn test_remove_all_sends_literal_all() {
        let request = manager().remove_all_subscriptions_request();

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(request.get_param("object"), Some("all"));
    }

    #[test]
    fn test_list_request() {
        let request = manager().list_all_subscriptions_request();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(names(&request), vec!["client_id", "client_secret"]);
    }
}
