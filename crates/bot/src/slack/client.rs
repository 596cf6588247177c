//! Slack Web API client.
//!
//! Implements the [`MessagingGateway`] capability over Slack's Web API and
//! verifies inbound webhook signatures.

use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, instrument};

use incidentbot_core::{ChannelId, SlackUserId};

use super::error::SlackError;
use super::types::{ApiResponse, Block, CreateChannelResponse, HomeView, ModalView};
use crate::config::SlackConfig;
use crate::gateway::MessagingGateway;

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Replay window for webhook timestamps, in seconds.
const SIGNATURE_MAX_AGE_SECS: i64 = 300;

/// Slack API client.
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    bot_token: SecretString,
    /// Signing secret for verifying webhooks.
    signing_secret: SecretString,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    #[must_use]
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            client: Client::new(),
            bot_token: config.bot_token.clone(),
            signing_secret: config.signing_secret.clone(),
        }
    }

    /// POST a JSON body to a Web API method and decode the response envelope.
    async fn call<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, SlackError> {
        let response = self
            .client
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))
    }

    /// POST to a method whose response carries nothing beyond the envelope.
    async fn call_ack<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<(), SlackError> {
        let result: ApiResponse = self.call(method, body).await?;
        if result.ok {
            debug!(method, "Slack API call succeeded");
            Ok(())
        } else {
            Err(SlackError::Api(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }

    /// Verify a Slack webhook signature.
    ///
    /// Implements Slack's v0 signature scheme:
    /// <https://api.slack.com/authentication/verifying-requests-from-slack>
    ///
    /// # Arguments
    ///
    /// * `timestamp` - The `X-Slack-Request-Timestamp` header value
    /// * `body` - The raw request body
    /// * `signature` - The `X-Slack-Signature` header value
    ///
    /// # Errors
    ///
    /// Returns error if the timestamp is stale or the signature does not
    /// match.
    #[instrument(skip(self, body, signature))]
    pub fn verify_signature(
        &self,
        timestamp: &str,
        body: &str,
        signature: &str,
    ) -> Result<(), SlackError> {
        // Check timestamp to prevent replay attacks
        let ts: i64 = timestamp
            .parse()
            .map_err(|_| SlackError::InvalidSignature("Invalid timestamp".to_string()))?;

        let now_secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| SlackError::InvalidSignature(e.to_string()))?
            .as_secs();

        let now = i64::try_from(now_secs)
            .map_err(|_| SlackError::InvalidSignature("System time overflow".to_string()))?;

        if (now - ts).abs() > SIGNATURE_MAX_AGE_SECS {
            return Err(SlackError::InvalidSignature(
                "Timestamp outside replay window".to_string(),
            ));
        }

        let expected = signature
            .strip_prefix("v0=")
            .ok_or_else(|| SlackError::InvalidSignature("Missing v0 prefix".to_string()))?;
        let expected = hex::decode(expected)
            .map_err(|_| SlackError::InvalidSignature("Signature is not hex".to_string()))?;

        let mut mac = Hmac::<Sha256>::new_from_slice(
            self.signing_secret.expose_secret().as_bytes(),
        )
        .map_err(|e| SlackError::InvalidSignature(e.to_string()))?;
        mac.update(format!("v0:{timestamp}:{body}").as_bytes());

        mac.verify_slice(&expected)
            .map_err(|_| SlackError::InvalidSignature("Signature mismatch".to_string()))
    }
}

impl MessagingGateway for SlackClient {
    /// Create a public channel via `conversations.create`.
    #[instrument(skip(self), fields(channel_name = %name))]
    async fn create_channel(&self, name: &str) -> Result<ChannelId, SlackError> {
        #[derive(Serialize)]
        struct CreateChannel<'a> {
            name: &'a str,
        }

        let result: CreateChannelResponse = self
            .call("conversations.create", &CreateChannel { name })
            .await?;

        if !result.ok {
            return Err(SlackError::Api(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let channel = result
            .channel
            .ok_or_else(|| SlackError::Response("Missing channel in response".to_string()))?;

        debug!(channel_id = %channel.id, "Channel created");
        Ok(ChannelId::new(channel.id))
    }

    #[instrument(skip(self, topic), fields(channel = %channel))]
    async fn set_topic(&self, channel: &ChannelId, topic: &str) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct SetTopic<'a> {
            channel: &'a str,
            topic: &'a str,
        }

        self.call_ack(
            "conversations.setTopic",
            &SetTopic {
                channel: channel.as_str(),
                topic,
            },
        )
        .await
    }

    /// Invite users via `conversations.invite` (comma-separated ids).
    #[instrument(skip(self, users), fields(channel = %channel, count = users.len()))]
    async fn invite(&self, channel: &ChannelId, users: &[SlackUserId]) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct Invite<'a> {
            channel: &'a str,
            users: String,
        }

        let users = users
            .iter()
            .map(SlackUserId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        self.call_ack(
            "conversations.invite",
            &Invite {
                channel: channel.as_str(),
                users,
            },
        )
        .await
    }

    #[instrument(skip(self, blocks, fallback), fields(channel = %channel))]
    async fn post_message(
        &self,
        channel: &ChannelId,
        blocks: Vec<Block>,
        fallback: &str,
    ) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct PostMessage<'a> {
            channel: &'a str,
            blocks: Vec<Block>,
            text: &'a str,
        }

        self.call_ack(
            "chat.postMessage",
            &PostMessage {
                channel: channel.as_str(),
                blocks,
                text: fallback,
            },
        )
        .await
    }

    #[instrument(skip(self, text), fields(channel = %channel, user = %user))]
    async fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &SlackUserId,
        text: &str,
    ) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct PostEphemeral<'a> {
            channel: &'a str,
            user: &'a str,
            text: &'a str,
        }

        self.call_ack(
            "chat.postEphemeral",
            &PostEphemeral {
                channel: channel.as_str(),
                user: user.as_str(),
                text,
            },
        )
        .await
    }

    #[instrument(skip(self), fields(channel = %channel, emoji = %emoji))]
    async fn add_reaction(
        &self,
        channel: &ChannelId,
        timestamp: &str,
        emoji: &str,
    ) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct AddReaction<'a> {
            channel: &'a str,
            timestamp: &'a str,
            name: &'a str,
        }

        self.call_ack(
            "reactions.add",
            &AddReaction {
                channel: channel.as_str(),
                timestamp,
                name: emoji,
            },
        )
        .await
    }

    #[instrument(skip(self, view), fields(user = %user))]
    async fn publish_home(&self, user: &SlackUserId, view: HomeView) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct PublishView<'a> {
            user_id: &'a str,
            view: HomeView,
        }

        self.call_ack(
            "views.publish",
            &PublishView {
                user_id: user.as_str(),
                view,
            },
        )
        .await
    }

    #[instrument(skip(self, view))]
    async fn open_modal(&self, trigger_id: &str, view: ModalView) -> Result<(), SlackError> {
        #[derive(Serialize)]
        struct OpenView<'a> {
            trigger_id: &'a str,
            view: ModalView,
        }

        self.call_ack("views.open", &OpenView { trigger_id, view })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(secret: &str) -> SlackClient {
        SlackClient::new(&SlackConfig {
            bot_token: "xoxb-test".into(),
            signing_secret: secret.into(),
        })
    }

    fn sign(secret: &str, timestamp: &str, body: &str) -> String {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("any key length works");
        mac.update(format!("v0:{timestamp}:{body}").as_bytes());
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn now_ts() -> String {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("after epoch")
            .as_secs()
            .to_string()
    }

    #[test]
    fn test_verify_signature_accepts_valid() {
        let client = client("8f742231b10e8888abcd99yyyzzz85a5");
        let ts = now_ts();
        let body = "payload=%7B%22type%22%3A%22shortcut%22%7D";
        let sig = sign("8f742231b10e8888abcd99yyyzzz85a5", &ts, body);
        assert!(client.verify_signature(&ts, body, &sig).is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_wrong_secret() {
        let client = client("correct-secret");
        let ts = now_ts();
        let sig = sign("wrong-secret", &ts, "body");
        assert!(client.verify_signature(&ts, "body", &sig).is_err());
    }

    #[test]
    fn test_verify_signature_rejects_stale_timestamp() {
        let client = client("secret");
        let sig = sign("secret", "1531420618", "body");
        assert!(client.verify_signature("1531420618", "body", &sig).is_err());
    }

    #[test]
    fn test_verify_signature_rejects_malformed() {
        let client = client("secret");
        let ts = now_ts();
        assert!(client.verify_signature(&ts, "body", "nope").is_err());
        assert!(client.verify_signature("not-a-number", "body", "v0=00").is_err());
    }
}
