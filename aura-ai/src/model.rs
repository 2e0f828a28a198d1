//! The narrow seam to the hosted generative model.
//!
//! Everything above this module speaks `GenerateRequest` in, reply text out,
//! so the remote call can be swapped for a deterministic double in tests.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversational turn. Roles are the wire values `user` / `model`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// A single request to the model: instruction turns plus an optional
/// declarative response schema and JSON-only directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<ChatTurn>,
    pub response_schema: Option<Value>,
    pub json_output: bool,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run one request to completion and return the reply text. No retries,
    /// no timeout beyond transport defaults, no cancellation.
    async fn generate(&self, req: &GenerateRequest) -> Result<String>;
}

/// REST client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, req: &GenerateRequest) -> Result<String> {
        #[derive(Serialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct Content {
            role: String,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        struct SystemInstruction {
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            #[serde(skip_serializing_if = "Option::is_none")]
            response_mime_type: Option<String>,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_schema: Option<Value>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req {
            contents: Vec<Content>,
            #[serde(skip_serializing_if = "Option::is_none")]
            system_instruction: Option<SystemInstruction>,
            #[serde(skip_serializing_if = "Option::is_none")]
            generation_config: Option<GenerationConfig>,
        }

        #[derive(Deserialize)]
        struct Resp {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }

        #[derive(Deserialize)]
        struct RespContent {
            parts: Option<Vec<RespPart>>,
        }

        #[derive(Deserialize)]
        struct RespPart {
            text: Option<String>,
        }

        let contents = req
            .turns
            .iter()
            .map(|t| Content {
                role: t.role.clone(),
                parts: vec![Part {
                    text: t.content.clone(),
                }],
            })
            .collect();

        let generation_config = (req.json_output || req.response_schema.is_some()).then(|| {
            GenerationConfig {
                response_mime_type: req.json_output.then(|| "application/json".to_string()),
                response_schema: req.response_schema.clone(),
            }
        });

        let body = Req {
            contents,
            system_instruction: req.system_instruction.as_ref().map(|s| SystemInstruction {
                parts: vec![Part { text: s.clone() }],
            }),
            generation_config,
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let resp = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("gemini request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("gemini error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse gemini response")?;
        let mut s = String::new();
        if let Some(candidate) = out.candidates.unwrap_or_default().into_iter().next() {
            for part in candidate.content.and_then(|c| c.parts).unwrap_or_default() {
                if let Some(t) = part.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }
}
