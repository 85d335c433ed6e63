//! Request enums and response types for the subscriptions endpoint

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::client::ApiResponse;
use crate::error::Error;

/// Header carrying the hourly request quota
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Header carrying the remaining requests in the current window
pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Kind of entity a subscription watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionObject {
    User,
    Tag,
    Location,
    Geography,
}

impl SubscriptionObject {
    pub const ALL: [SubscriptionObject; 4] = [
        SubscriptionObject::User,
        SubscriptionObject::Tag,
        SubscriptionObject::Location,
        SubscriptionObject::Geography,
    ];

    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionObject::User => "user",
            SubscriptionObject::Tag => "tag",
            SubscriptionObject::Location => "location",
            SubscriptionObject::Geography => "geography",
        }
    }

    /// Whether subscriptions of this kind target a specific `object_id`
    pub fn takes_object_id(&self) -> bool {
        matches!(self, SubscriptionObject::Tag | SubscriptionObject::Location)
    }
}

impl FromStr for SubscriptionObject {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|object| object.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Other(format!("unknown subscription object: {s}")))
    }
}

/// Kind of change that triggers a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionAspect {
    Media,
}

impl SubscriptionAspect {
    pub const ALL: [SubscriptionAspect; 1] = [SubscriptionAspect::Media];

    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionAspect::Media => "media",
        }
    }
}

impl FromStr for SubscriptionAspect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|aspect| aspect.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Other(format!("unknown subscription aspect: {s}")))
    }
}

macro_rules! wire_name_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_name_impls!(SubscriptionObject);
wire_name_impls!(SubscriptionAspect);

/// A subscription registered with the real-time API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub object: SubscriptionObject,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub object_id: Option<String>,
    pub aspect: SubscriptionAspect,
    pub callback_url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// The `meta` block of every API response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Minimal view of a response body, used to read error details
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub meta: Meta,
}

/// Transport-level metadata of a response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseInfo {
    pub status: u16,
    pub rate_limit_limit: Option<u32>,
    pub rate_limit_remaining: Option<u32>,
}

impl ResponseInfo {
    pub fn from_parts(status: StatusCode, headers: &HeaderMap) -> Self {
        let header_u32 = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
        };

        Self {
            status: status.as_u16(),
            rate_limit_limit: header_u32(RATE_LIMIT_LIMIT_HEADER),
            rate_limit_remaining: header_u32(RATE_LIMIT_REMAINING_HEADER),
        }
    }
}

/// Response of every subscriptions operation
///
/// `data` is normalized to a list: list calls return many records, create
/// returns one, deletes return none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionsResponse {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, deserialize_with = "one_or_many")]
    pub data: Vec<Subscription>,
    #[serde(skip_deserializing)]
    pub info: ResponseInfo,
}

impl ApiResponse for SubscriptionsResponse {
    fn attach_info(&mut self, info: ResponseInfo) {
        self.info = info;
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Subscription>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Subscription>),
        One(Subscription),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

/// Identifiers arrive as JSON strings or numbers depending on the endpoint
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
