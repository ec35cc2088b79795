//! Discord REST backend for the display gateway.
//!
//! Thin client over the channel-message endpoints. 404 and 403 responses map
//! to the typed gateway errors so the engine can recover from a deleted
//! message and abort on missing permissions.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{DisplayContent, DisplayError, DisplayGateway, DisplayResult, MessageHandle};

/// Base URL of the Discord REST API.
const API_BASE: &str = "https://discord.com/api/v10";
/// Component identifier of the target select menu.
const SELECT_CUSTOM_ID: &str = "target_select";

/// Runtime configuration for the Discord display backend.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token presented via the `Authorization` header.
    pub bot_token: String,
    /// Channel the status message lives in.
    pub channel_id: String,
}

/// Display gateway backed by a Discord channel.
#[derive(Clone)]
pub struct DiscordDisplay {
    client: Client,
    token: Arc<str>,
    channel_id: Arc<str>,
}

impl DiscordDisplay {
    /// Build the backend with its own HTTP client.
    pub fn new(config: DiscordConfig) -> DisplayResult<Self> {
        let client = Client::builder().build().map_err(DisplayError::transport)?;
        Ok(Self {
            client,
            token: Arc::from(config.bot_token),
            channel_id: Arc::from(config.channel_id),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{API_BASE}/channels/{}/{path}", self.channel_id);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.token))
    }

    async fn send(builder: reqwest::RequestBuilder) -> DisplayResult<reqwest::Response> {
        let response = builder.send().await.map_err(DisplayError::transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(DisplayError::NotFound),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_default();
                Err(DisplayError::Forbidden(body))
            }
            status if status.is_success() => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DisplayError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl DisplayGateway for DiscordDisplay {
    fn create_message(
        &self,
        content: DisplayContent,
    ) -> BoxFuture<'static, DisplayResult<MessageHandle>> {
        let gateway = self.clone();
        Box::pin(async move {
            let payload = MessagePayload::from_content(content);
            let response =
                Self::send(gateway.request(Method::POST, "messages").json(&payload)).await?;
            let message: MessageRef = response.json().await.map_err(DisplayError::transport)?;
            Ok(message.id)
        })
    }

    fn edit_message(
        &self,
        handle: MessageHandle,
        content: DisplayContent,
    ) -> BoxFuture<'static, DisplayResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            let payload = MessagePayload::from_content(content);
            let path = format!("messages/{handle}");
            Self::send(gateway.request(Method::PATCH, &path).json(&payload)).await?;
            Ok(())
        })
    }

    fn fetch_message(&self, handle: MessageHandle) -> BoxFuture<'static, DisplayResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("messages/{handle}");
            Self::send(gateway.request(Method::GET, &path)).await?;
            Ok(())
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct MessagePayload {
    embeds: Vec<WireEmbed>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<WireActionRow>,
}

#[derive(Debug, Serialize)]
struct WireEmbed {
    title: String,
    description: String,
    fields: Vec<WireField>,
}

#[derive(Debug, Serialize)]
struct WireField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct WireActionRow {
    #[serde(rename = "type")]
    kind: u8,
    components: Vec<WireSelect>,
}

#[derive(Debug, Serialize)]
struct WireSelect {
    #[serde(rename = "type")]
    kind: u8,
    custom_id: String,
    placeholder: String,
    options: Vec<WireOption>,
}

#[derive(Debug, Serialize)]
struct WireOption {
    label: String,
    value: String,
    default: bool,
}

impl MessagePayload {
    fn from_content(content: DisplayContent) -> Self {
        let components = if content.menu.is_empty() {
            Vec::new()
        } else {
            vec![WireActionRow {
                kind: 1,
                components: vec![WireSelect {
                    kind: 3,
                    custom_id: SELECT_CUSTOM_ID.to_string(),
                    placeholder: "Select a server…".to_string(),
                    options: content
                        .menu
                        .into_iter()
                        .map(|option| WireOption {
                            label: option.label,
                            value: option.value,
                            default: option.selected,
                        })
                        .collect(),
                }],
            }]
        };

        Self {
            embeds: vec![WireEmbed {
                title: content.embed.title,
                description: content.embed.description,
                fields: content
                    .embed
                    .fields
                    .into_iter()
                    .map(|field| WireField {
                        name: field.name,
                        value: field.value,
                        inline: field.inline,
                    })
                    .collect(),
            }],
            components,
        }
    }
}
