use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Produces one embedding vector per input text, in request order.
#[async_trait]
pub trait Embeddings: Send + Sync {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// An OpenAI-compatible `/embeddings` endpoint behind bearer-token auth.
pub struct RemoteEmbeddings {
    model: String,
    api_key: String,
    base_url: String,
    port: Option<u16>,
    client: reqwest::Client,
}

impl RemoteEmbeddings {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into(),
            port: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn endpoint(&self) -> String {
        if self.base_url.starts_with("http") {
            match self.port {
                Some(port) => format!("{}:{}/embeddings", self.base_url, port),
                None => format!("{}/embeddings", self.base_url),
            }
        } else {
            format!("https://{}/embeddings", self.base_url)
        }
    }
}

#[async_trait]
impl Embeddings for RemoteEmbeddings {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                input: texts,
                model: &self.model,
            })
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(BridgeError::Embedding {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
    }
}

/// Deterministic whitespace-token embedder with hashed buckets.
///
/// No network, stable across runs; suitable for tests and offline retrieval.
pub struct HashedBucketEmbeddings {
    buckets: usize,
}

impl Default for HashedBucketEmbeddings {
    fn default() -> Self {
        Self { buckets: 384 }
    }
}

impl HashedBucketEmbeddings {
    pub fn new(buckets: usize) -> Self {
        Self { buckets }
    }
}

#[async_trait]
impl Embeddings for HashedBucketEmbeddings {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use std::hash::{Hash, Hasher};

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            let mut vector = vec![0.0; self.buckets];
            for token in text.split_whitespace() {
                let mut hasher = std::collections::hash_map::DefaultHasher::new();
                token.hash(&mut hasher);
                let idx = (hasher.finish() as usize) % self.buckets;
                vector[idx] += 1.0;
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_handles_scheme_and_port_variants() {
        let plain = RemoteEmbeddings::new("m", "key", "api.example.com");
        assert_eq!(plain.endpoint(), "https://api.example.com/embeddings");

        let with_scheme = RemoteEmbeddings::new("m", "key", "http://localhost");
        assert_eq!(with_scheme.endpoint(), "http://localhost/embeddings");

        let with_port = RemoteEmbeddings::new("m", "key", "http://localhost").with_port(8080);
        assert_eq!(with_port.endpoint(), "http://localhost:8080/embeddings");
    }

    #[test]
    fn response_entries_decode_in_request_order() {
        let parsed: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [{"embedding": [0.1, 0.2]}, {"embedding": [0.3]}]}"#,
        )
        .unwrap();
        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|e| e.embedding).collect();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3]]);
    }
}
