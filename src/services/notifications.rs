use reqwest::Client;
use serde_json::json;

const SLACK_API: &str = "https://slack.com/api";

/// Build the chat.postMessage payload.
pub fn message_payload(channel: &str, text: &str) -> serde_json::Value {
    json!({ "channel": channel, "text": text })
}

/// Outbound chat collaborator (Slack Web API). Calls are synchronous within
/// the enclosing request and never retried; callers decide whether a failure
/// is surfaced (reminders) or merely logged (channel invites).
pub struct ChatNotifier {
    client: Client,
    bot_token: Option<String>,
    channel_id: String,
}

impl ChatNotifier {
    pub fn new(bot_token: Option<String>, channel_id: String) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            channel_id,
        }
    }

    /// Post a message to the configured channel. An unconfigured notifier is
    /// a failure here: the reminder flow reports it to the user.
    pub async fn post_message(&self, text: &str) -> anyhow::Result<()> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("chat notifier not configured"))?;

        let response = self
            .client
            .post(format!("{SLACK_API}/chat.postMessage"))
            .bearer_auth(token)
            .json(&message_payload(&self.channel_id, text))
            .send()
            .await?
            .error_for_status()?;

        // Slack reports API-level failures as 200 with ok=false.
        let body: serde_json::Value = response.json().await?;
        if !body["ok"].as_bool().unwrap_or(false) {
            anyhow::bail!(
                "chat delivery failed: {}",
                body["error"].as_str().unwrap_or("unknown")
            );
        }
        tracing::info!(channel = %self.channel_id, "chat reminder sent");
        Ok(())
    }

    /// Invite an email's chat user to the menu channel. Best effort: when the
    /// notifier is unconfigured this is a silent no-op, and callers only log
    /// errors — an invite must never fail account creation.
    pub async fn invite_by_email(&self, email: &str) -> anyhow::Result<()> {
        let token = match self.bot_token.as_deref() {
            Some(t) => t,
            None => {
                tracing::debug!("chat notifier not configured, skipping channel invite");
                return Ok(());
            }
        };

        let lookup: serde_json::Value = self
            .client
            .get(format!("{SLACK_API}/users.lookupByEmail"))
            .bearer_auth(token)
            .query(&[("email", email)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let user_id = lookup["user"]["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("no chat user for {email}"))?
            .to_string();

        let body: serde_json::Value = self
            .client
            .post(format!("{SLACK_API}/conversations.invite"))
            .bearer_auth(token)
            .json(&json!({ "channel": self.channel_id, "users": user_id }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !body["ok"].as_bool().unwrap_or(false) {
            anyhow::bail!(
                "channel invite failed: {}",
                body["error"].as_str().unwrap_or("unknown")
            );
        }
        tracing::info!(email = %email, channel = %self.channel_id, "invited to menu channel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_channel_and_text() {
        let payload = message_payload("lunch-menu", "menu link");
        assert_eq!(payload["channel"], "lunch-menu");
        assert_eq!(payload["text"], "menu link");
    }

    #[tokio::test]
    async fn unconfigured_post_fails_but_invite_is_noop() {
        let notifier = ChatNotifier::new(None, "lunch-menu".into());
        assert!(notifier.post_message("hello").await.is_err());
        assert!(notifier.invite_by_email("a@b.cl").await.is_ok());
    }
}
