use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::embeddings::Embeddings;
use crate::error::Result;

pub const DEFAULT_SEARCH_LIMIT: usize = 3;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.4;
/// Vector configuration used when a collection is (re)created.
pub const DEFAULT_VECTOR_SIZE: usize = 384;

/// Retrieval storage as the prompt pipeline consumes it.
#[async_trait]
pub trait Store: Send + Sync {
    /// Top-ranked stored texts for `query`, best match first. Matches scoring
    /// below `score_threshold` are excluded by the backing store.
    async fn search(&self, query: &str, limit: usize, score_threshold: f32) -> Result<Vec<String>>;

    /// Embed and persist one value under a fresh identifier.
    async fn save(&self, value: &str) -> Result<()>;

    /// Drop and recreate the collection. Destructive and unconditional.
    async fn reset(&self) -> Result<()>;
}

/// One embedded record as the wire client stores it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
}

/// A search hit returned by the wire client, rank order preserved.
#[derive(Clone, Debug)]
pub struct PointMatch {
    pub text: String,
    pub score: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distance {
    Cosine,
}

#[derive(Clone, Copy, Debug)]
pub struct CollectionConfig {
    pub vector_size: usize,
    pub distance: Distance,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            vector_size: DEFAULT_VECTOR_SIZE,
            distance: Distance::Cosine,
        }
    }
}

/// The opaque capability an external vector database exposes to the bridge.
///
/// Wire details (protocols, retries, consistency) belong to the implementor;
/// the bridge adds no locking and no retry policy of its own.
#[async_trait]
pub trait VectorClient: Send + Sync {
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()>;
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<PointMatch>>;
    async fn delete_collection(&self, collection: &str) -> Result<()>;
    async fn create_collection(&self, collection: &str, config: CollectionConfig) -> Result<()>;
}

/// Embedding-backed storage over an external vector collection.
pub struct VectorStore {
    embeddings: Arc<dyn Embeddings>,
    client: Arc<dyn VectorClient>,
    collection: String,
}

impl VectorStore {
    pub fn new(
        embeddings: Arc<dyn Embeddings>,
        client: Arc<dyn VectorClient>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embeddings,
            client,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embeddings.embed_texts(&[text.to_string()]).await?;
        Ok(vectors.pop().unwrap_or_default())
    }
}

#[async_trait]
impl Store for VectorStore {
    async fn search(&self, query: &str, limit: usize, score_threshold: f32) -> Result<Vec<String>> {
        let vector = self.embed_one(query).await?;
        let matches = self
            .client
            .search(&self.collection, vector, limit, score_threshold)
            .await?;
        Ok(matches.into_iter().map(|hit| hit.text).collect())
    }

    async fn save(&self, value: &str) -> Result<()> {
        let vector = self.embed_one(value).await?;
        self.client
            .upsert(
                &self.collection,
                VectorPoint {
                    id: Uuid::new_v4().to_string(),
                    vector,
                    text: value.to_string(),
                },
            )
            .await
    }

    async fn reset(&self) -> Result<()> {
        self.client.delete_collection(&self.collection).await?;
        self.client
            .create_collection(&self.collection, CollectionConfig::default())
            .await
    }
}

/// A process-local vector client for tests and offline runs.
#[derive(Default)]
pub struct InMemoryVectorClient {
    collections: RwLock<HashMap<String, Vec<VectorPoint>>>,
}

#[async_trait]
impl VectorClient for InMemoryVectorClient {
    async fn upsert(&self, collection: &str, point: VectorPoint) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(point);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<PointMatch>> {
        let collections = self.collections.read().await;
        let points = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);
        let mut matches: Vec<PointMatch> = points
            .iter()
            .map(|point| PointMatch {
                text: point.text.clone(),
                score: cosine_similarity(&point.vector, &vector),
            })
            .filter(|hit| hit.score >= score_threshold)
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().await.remove(collection);
        Ok(())
    }

    async fn create_collection(&self, collection: &str, _config: CollectionConfig) -> Result<()> {
        self.collections
            .write()
            .await
            .insert(collection.to_string(), Vec::new());
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashedBucketEmbeddings;

    fn store() -> VectorStore {
        VectorStore::new(
            Arc::new(HashedBucketEmbeddings::default()),
            Arc::new(InMemoryVectorClient::default()),
            "notes",
        )
    }

    #[tokio::test]
    async fn saved_text_comes_back_from_search() {
        let store = store();
        store.save("the sky is blue").await.unwrap();
        store.save("grass is green").await.unwrap();

        let hits = store
            .search("the sky is blue", DEFAULT_SEARCH_LIMIT, DEFAULT_SCORE_THRESHOLD)
            .await
            .unwrap();
        assert_eq!(hits.first().map(String::as_str), Some("the sky is blue"));
    }

    #[tokio::test]
    async fn search_respects_the_limit() {
        let store = store();
        for index in 0..5 {
            store.save(&format!("note number {index}")).await.unwrap();
        }
        let hits = store.search("note number 1", 2, 0.0).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn reset_drops_all_points() {
        let store = store();
        store.save("ephemeral").await.unwrap();
        store.reset().await.unwrap();
        let hits = store.search("ephemeral", DEFAULT_SEARCH_LIMIT, 0.0).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn below_threshold_matches_are_excluded_by_the_client() {
        let client = InMemoryVectorClient::default();
        client
            .upsert(
                "c",
                VectorPoint {
                    id: "1".into(),
                    vector: vec![1.0, 0.0],
                    text: "aligned".into(),
                },
            )
            .await
            .unwrap();
        client
            .upsert(
                "c",
                VectorPoint {
                    id: "2".into(),
                    vector: vec![0.0, 1.0],
                    text: "orthogonal".into(),
                },
            )
            .await
            .unwrap();

        let hits = client.search("c", vec![1.0, 0.0], 10, 0.5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "aligned");
    }
}
