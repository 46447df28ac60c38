use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use base64ct::{Base64, Encoding};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, instrument};

use super::{schema, ContentGenerator, GenerationError, GenerationRequest, PartialStream};
use crate::config::GenAiConfig;

/// REST client for the Gemini `generateContent` family.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    vision_model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Text carried by one `data:` line of the SSE stream, if any.
fn sse_text(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    let chunk: GenerateResponse = serde_json::from_str(payload).ok()?;
    let text = chunk.text();
    (!text.is_empty()).then_some(text)
}

impl GeminiClient {
    pub fn new(cfg: &GenAiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build genai http client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            vision_model: cfg.vision_model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, request: &GenerationRequest, method: &str) -> String {
        let model = if request.kind.uses_vision() {
            &self.vision_model
        } else {
            &self.model
        };
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    fn body(request: &GenerationRequest) -> Value {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &request.image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": Base64::encode_string(&image.data),
                }
            }));
        }
        parts.push(json!({ "text": request.prompt }));
        json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema::shape(request.kind),
            }
        })
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, GenerationError> {
        let res = self
            .http
            .post(self.endpoint(request, method))
            .query(query)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::body(request))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            error!(status, kind = ?request.kind, "genai request rejected");
            return Err(GenerationError::Status { status, body });
        }
        Ok(res)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(kind = ?request.kind))]
    async fn generate(&self, request: GenerationRequest) -> Result<Value, GenerationError> {
        let res = self.send(&request, "generateContent", &[]).await?;
        let body: GenerateResponse = res.json().await?;
        let text = body.text();
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        debug!(bytes = text.len(), "genai response");
        Ok(serde_json::from_str(&text)?)
    }

    #[instrument(skip(self, request), fields(kind = ?request.kind))]
    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<PartialStream, GenerationError> {
        let res = self
            .send(&request, "streamGenerateContent", &[("alt", "sse")])
            .await?;
        let mut body = res.bytes_stream();
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::new();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(GenerationError::Http(e))).await;
                        return;
                    }
                };
                buf.extend_from_slice(&chunk);
                while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buf.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    if let Some(text) = sse_text(line.trim()) {
                        if tx.send(Ok(text)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            let rest = String::from_utf8_lossy(&buf);
            if let Some(text) = sse_text(rest.trim()) {
                let _ = tx.send(Ok(text)).await;
            }
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{ContentKind, InlineImage};
    use bytes::Bytes;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(&GenAiConfig {
            api_key: "test-key".into(),
            model: "text-model".into(),
            vision_model: "vision-model".into(),
            base_url: base_url.into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn candidate(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn body_puts_image_before_prompt() {
        let req = GenerationRequest::with_image(
            ContentKind::FoodIdentity,
            "What is this food name?",
            InlineImage {
                mime_type: "image/png",
                data: Bytes::from_static(b"abc"),
            },
        );
        let body = GeminiClient::body(&req);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "YWJj");
        assert_eq!(parts[1]["text"], "What is this food name?");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn sse_line_parsing() {
        let line = format!("data: {}", candidate("{\"na"));
        assert_eq!(sse_text(&line).as_deref(), Some("{\"na"));
        assert_eq!(sse_text(""), None);
        assert_eq!(sse_text("event: ping"), None);
    }

    #[tokio::test]
    async fn generate_parses_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/text-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"title\":\"Calm\"}")))
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server.uri())
            .generate(GenerationRequest::text(ContentKind::Title, "a title"))
            .await
            .unwrap();
        assert_eq!(out, json!({ "title": "Calm" }));
    }

    #[tokio::test]
    async fn vision_kinds_use_vision_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/vision-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"ingredients\":[]}")))
            .expect(1)
            .mount(&server)
            .await;

        let req = GenerationRequest::with_image(
            ContentKind::FoodIngredients,
            "What ingredients make up this food?",
            InlineImage {
                mime_type: "image/jpeg",
                data: Bytes::from_static(&[0xff, 0xd8, 0xff]),
            },
        );
        let out = client(&server.uri()).generate(req).await.unwrap();
        assert_eq!(out["ingredients"], json!([]));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(GenerationRequest::text(ContentKind::Mood, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .generate(GenerationRequest::text(ContentKind::Mood, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }

    #[tokio::test]
    async fn stream_yields_each_sse_fragment() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\r\n\r\ndata: {}\r\n\r\n",
            candidate("{\"name\":"),
            candidate("\"Ugali\"}")
        );
        Mock::given(method("POST"))
            .and(path("/v1beta/models/vision-model:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let req = GenerationRequest::with_image(
            ContentKind::FoodIdentity,
            "What is this food name?",
            InlineImage {
                mime_type: "image/png",
                data: Bytes::from_static(b"png"),
            },
        );
        let parts: Vec<String> = client(&server.uri())
            .generate_stream(req)
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(parts, vec!["{\"name\":".to_string(), "\"Ugali\"}".to_string()]);
    }
}
