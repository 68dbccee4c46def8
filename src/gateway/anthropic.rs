use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{CompletionRequest, GatewayError, ModelGateway};
use crate::config::Config;

pub struct AnthropicGateway {
    model: String,
    api_key: String,
    api_base: String,
    api_version: String,
    timeout: Duration,
    client: Client,
}

impl AnthropicGateway {
    pub fn new(cfg: &Config, api_key: String) -> Self {
        Self {
            model: cfg.model.clone(),
            api_key,
            api_base: cfg.api_base.clone(),
            api_version: cfg.api_version.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            client: Client::new(),
        }
    }

    fn body(&self, req: &CompletionRequest) -> serde_json::Value {
        let content = match &req.image {
            Some(img) => json!([
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": img.media_type,
                        "data": img.data
                    }
                },
                { "type": "text", "text": req.user }
            ]),
            None => json!(req.user),
        };

        let mut body = json!({
            "model": self.model,
            "max_tokens": req.max_tokens,
            "messages": [{ "role": "user", "content": content }]
        });
        if let Some(system) = &req.system {
            body["system"] = json!(system);
        }
        body
    }
}

#[async_trait]
impl ModelGateway for AnthropicGateway {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String, GatewayError> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = self.body(req);

        if debug {
            eprintln!("debug/anthropic: POST {url} (image: {})", req.image.is_some());
        }

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if debug {
            eprintln!("debug/anthropic: raw status: {status}");
            eprintln!("debug/anthropic: raw body:\n{text}\n");
        }

        if !status.is_success() {
            return Err(GatewayError::Status { status, body: text });
        }

        // Minimal structs to parse the messages response
        #[derive(Deserialize)]
        struct MsgResponse {
            content: Vec<Block>,
        }
        #[derive(Deserialize)]
        struct Block {
            #[serde(default)]
            text: String,
            #[serde(default)]
            r#type: String,
        }

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::MalformedResponse(format!("{e}")))?;

        parsed
            .content
            .into_iter()
            .find(|b| b.r#type == "text" || !b.text.is_empty())
            .map(|b| b.text)
            .ok_or_else(|| GatewayError::MalformedResponse("empty content".into()))
    }
}
