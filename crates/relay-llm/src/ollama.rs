//! Native Ollama API client for text generation and model readiness.
//!
//! Generation uses `/api/generate` in streaming mode and buffers the fragments;
//! readiness reads the `/api/tags` model listing.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use relay_config::RelayConfig;
use relay_core::{HealthStatus, RelayError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::backend::{LlmBackend, ReadinessProbe};

/// Response from Ollama's /api/tags endpoint.
#[derive(Debug, Deserialize)]
pub struct OllamaTagsResponse {
    #[serde(default)]
    pub models: Vec<OllamaModelInfo>,
}

/// Information about a single Ollama model.
#[derive(Debug, Deserialize)]
pub struct OllamaModelInfo {
    #[serde(default)]
    pub name: String,
}

/// Performance metrics from Ollama's native API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaMetrics {
    #[serde(default)]
    pub total_duration: u64,
    #[serde(default)]
    pub load_duration: u64,
    #[serde(default)]
    pub prompt_eval_count: u32,
    #[serde(default)]
    pub prompt_eval_duration: u64,
    #[serde(default)]
    pub eval_count: u32,
    #[serde(default)]
    pub eval_duration: u64,
}

impl OllamaMetrics {
    /// Calculates tokens generated per second.
    pub fn tokens_per_sec(&self) -> f64 {
        if self.eval_duration == 0 {
            return 0.0;
        }
        (self.eval_count as f64) / (self.eval_duration as f64 / 1_000_000_000.0)
    }

    /// Total request duration in milliseconds.
    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration / 1_000_000
    }

    /// Model load time in milliseconds.
    pub fn load_duration_ms(&self) -> u64 {
        self.load_duration / 1_000_000
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One line of the `/api/generate` NDJSON stream.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    metrics: OllamaMetrics,
}

/// Buffered result of a finished generate stream.
#[derive(Debug, Default)]
struct GenerateOutput {
    text: String,
    metrics: Option<OllamaMetrics>,
}

/// Reassembles NDJSON lines from arbitrarily split body chunks.
#[derive(Debug, Default)]
struct GenerateDecoder {
    pending: Vec<u8>,
    output: GenerateOutput,
}

impl GenerateDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Result<(), RelayError> {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.handle_line(&line)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<GenerateOutput, RelayError> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.handle_line(&rest)?;
        }
        Ok(self.output)
    }

    fn handle_line(&mut self, raw: &[u8]) -> Result<(), RelayError> {
        let line = std::str::from_utf8(raw)
            .map_err(|e| RelayError::Unexpected(format!("Non UTF-8 stream line: {e}")))?
            .trim();
        if line.is_empty() {
            return Ok(());
        }

        let chunk: GenerateChunk = serde_json::from_str(line)?;
        if let Some(message) = chunk.error {
            return Err(RelayError::Unexpected(message));
        }

        if !chunk.response.is_empty() {
            trace!(fragment = %chunk.response, "Ollama stream");
            self.output.text.push_str(&chunk.response);
        }
        if chunk.done {
            self.output.metrics = Some(chunk.metrics);
        }
        Ok(())
    }
}

/// Error body Ollama sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

/// Reads the failure detail from a non-success response.
async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    if let Ok(body) = serde_json::from_str::<OllamaErrorBody>(&text) {
        return body.error;
    }
    let text = text.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("no details").to_string()
    } else {
        text.to_string()
    }
}

/// Maps a reqwest failure onto the relay's error kinds.
fn classify(err: reqwest::Error) -> RelayError {
    if err.is_builder() || err.is_decode() {
        RelayError::Unexpected(err.to_string())
    } else {
        RelayError::Transport(err.to_string())
    }
}

/// Returns true if a listed model name refers to `target`.
///
/// Ollama reports untagged pulls as `<name>:latest`.
fn model_matches(listed: &str, target: &str) -> bool {
    if listed == target {
        return true;
    }
    !target.contains(':') && listed.strip_suffix(":latest") == Some(target)
}

/// Client for Ollama's native API, bound to a single model.
pub struct OllamaClient {
    client: Client,
    api_base: String,
    model: String,
    probe_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl OllamaClient {
    /// Creates a client for the host and model named in `config`.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            probe_timeout: config.probe_timeout,
            request_timeout: config.request_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
        };

        let mut builder = self.client.post(self.url("/api/generate")).json(&request);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Ollama generate request failed: {}", e);
            classify(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = error_detail(response).await;
            error!("Ollama generate returned {}: {}", status.as_u16(), message);

            if status == StatusCode::NOT_FOUND {
                return Err(RelayError::ModelNotLoaded(self.model.clone()));
            }
            return Err(RelayError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let mut decoder = GenerateDecoder::default();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            decoder.feed(&chunk.map_err(classify)?)?;
        }
        let output = decoder.finish()?;

        if let Some(metrics) = &output.metrics {
            info!(
                "Ollama: {}ms total, {}ms load, {:.1} tok/s, {} eval tokens",
                metrics.total_duration_ms(),
                metrics.load_duration_ms(),
                metrics.tokens_per_sec(),
                metrics.eval_count
            );
        }

        Ok(output.text.trim().to_string())
    }
}

#[async_trait]
impl ReadinessProbe for OllamaClient {
    async fn check(&self) -> Result<HealthStatus, RelayError> {
        let sent = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.probe_timeout)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_builder() => return Err(RelayError::Unexpected(e.to_string())),
            Err(e) => return Ok(HealthStatus::unhealthy(&self.model, e)),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(HealthStatus::unhealthy(
                &self.model,
                format!("Status code: {}", status.as_u16()),
            ));
        }

        let tags: OllamaTagsResponse = match response.json().await {
            Ok(tags) => tags,
            Err(e) => return Ok(HealthStatus::unhealthy(&self.model, e)),
        };

        let model_ready = tags.models.iter().any(|m| model_matches(&m.name, &self.model));
        debug!(models = tags.models.len(), model_ready, "Ollama listed models");

        Ok(HealthStatus::healthy(tags.models.len(), model_ready, &self.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_joins_fragments_across_split_chunks() {
        let mut decoder = GenerateDecoder::default();
        decoder.feed(b"{\"response\":\"  hi\",\"done\":false}\n{\"resp").unwrap();
        decoder.feed(b"onse\":\" there  \",\"done\":false}\n").unwrap();
        decoder
            .feed(b"{\"response\":\"\",\"done\":true,\"eval_count\":4,\"eval_duration\":2000000000}")
            .unwrap();

        let output = decoder.finish().unwrap();
        assert_eq!(output.text, "  hi there  ");

        let metrics = output.metrics.unwrap();
        assert_eq!(metrics.eval_count, 4);
        assert!((metrics.tokens_per_sec() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decoder_skips_blank_lines() {
        let mut decoder = GenerateDecoder::default();
        decoder.feed(b"\n\r\n{\"response\":\"ok\",\"done\":true}\n\n").unwrap();
        assert_eq!(decoder.finish().unwrap().text, "ok");
    }

    #[test]
    fn decoder_surfaces_stream_error() {
        let mut decoder = GenerateDecoder::default();
        let err = decoder
            .feed(b"{\"error\":\"model runner has unexpectedly stopped\"}\n")
            .unwrap_err();
        assert_eq!(
            err,
            RelayError::Unexpected("model runner has unexpectedly stopped".into())
        );
    }

    #[test]
    fn decoder_rejects_garbage() {
        let mut decoder = GenerateDecoder::default();
        let err = decoder.feed(b"<html>bad gateway</html>\n").unwrap_err();
        assert!(matches!(err, RelayError::Unexpected(_)));
    }

    #[test]
    fn metrics_without_eval_time_report_zero_rate() {
        assert_eq!(OllamaMetrics::default().tokens_per_sec(), 0.0);
    }

    #[test]
    fn model_name_matching() {
        assert!(model_matches("llama3", "llama3"));
        assert!(model_matches("llama3:latest", "llama3"));
        assert!(!model_matches("llama3:8b", "llama3"));
        assert!(!model_matches("mistral", "llama3"));
        assert!(!model_matches("llama3:latest", "llama3:8b"));
    }

    #[test]
    fn client_trims_trailing_slash_from_host() {
        let config = RelayConfig {
            ollama_host: "http://ollama:11434/".into(),
            ..RelayConfig::default()
        };
        let client = OllamaClient::new(&config);
        assert_eq!(client.url("/api/tags"), "http://ollama:11434/api/tags");
    }
}
