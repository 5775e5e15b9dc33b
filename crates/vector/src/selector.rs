use async_trait::async_trait;
use linfa::metrics::SilhouetteScore;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, Axis};
use recap_common::{RecapError, Result};
use recap_llm::{ChunkSelector, LlmClient, TextChunk};
use std::sync::Arc;
use tracing::{debug, info};

use crate::similarity::{distinct_rows, normalize_rows, squared_distance};

/// Below this many chunks clustering is skipped and every chunk is kept
const MIN_CHUNKS_TO_CLUSTER: usize = 3;

/// Lloyd iteration cap per k-means run
const MAX_ITERATIONS: u64 = 100;

/// Picks one representative chunk per embedding cluster
///
/// Chunks are embedded, k-means runs for every k in
/// `2..=min(max_clusters, n - 1)`, and the k with the best silhouette wins.
/// The chunk nearest each centroid is returned, in document order.
pub struct ClusterSelector {
    client: Arc<dyn LlmClient>,
    embedding_model: String,
    max_clusters: usize,
    batch_size: usize,
}

/// Winning clustering
#[derive(Debug)]
struct Selection {
    k: usize,
    score: f64,
    picks: Vec<usize>,
}

impl ClusterSelector {
    pub fn new(
        client: Arc<dyn LlmClient>,
        embedding_model: impl Into<String>,
        max_clusters: usize,
    ) -> Self {
        Self {
            client,
            embedding_model: embedding_model.into(),
            max_clusters,
            batch_size: 64,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embed all chunks into a unit-normalized (n x dim) matrix
    async fn embed_chunks(&self, chunks: &[TextChunk]) -> Result<Array2<f64>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embeddings = self.client.embed(&self.embedding_model, batch).await?;
            if embeddings.len() != batch.len() {
                return Err(RecapError::external(
                    "embedding",
                    format!("Expected {} embeddings, received {}", batch.len(), embeddings.len()),
                ));
            }
            vectors.extend(embeddings);
        }

        let dim = vectors.first().map_or(0, Vec::len);
        if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
            return Err(RecapError::external(
                "embedding",
                "Embeddings have inconsistent dimensions",
            ));
        }

        let flat: Vec<f64> = vectors.into_iter().flatten().map(f64::from).collect();
        let data = Array2::from_shape_vec((chunks.len(), dim), flat)
            .map_err(|e| RecapError::internal(format!("Embedding matrix: {}", e)))?;

        Ok(normalize_rows(data))
    }
}

#[async_trait]
impl ChunkSelector for ClusterSelector {
    async fn select(&self, chunks: &[TextChunk]) -> Result<Vec<usize>> {
        let n = chunks.len();
        let max_k = self.max_clusters.min(n.saturating_sub(1));

        if n < MIN_CHUNKS_TO_CLUSTER || max_k < 2 {
            debug!("Skipping clustering for {} chunks", n);
            return Ok((0..n).collect());
        }

        let data = self.embed_chunks(chunks).await?;

        // k-means and silhouette are CPU bound
        let selection = tokio::task::spawn_blocking(move || best_clustering(data, max_k))
            .await
            .map_err(|e| RecapError::internal(format!("Clustering task aborted: {}", e)))??;

        info!(
            "Selected {} representative chunks of {} (k={}, silhouette={:.3})",
            selection.picks.len(),
            n,
            selection.k,
            selection.score
        );
        Ok(selection.picks)
    }
}

/// Fit k-means for every k in `2..=max_k` and keep the best silhouette
fn best_clustering(data: Array2<f64>, max_k: usize) -> Result<Selection> {
    // k-means++ seeding needs at least k distinct points
    let distinct = distinct_rows(&data);
    if distinct < 2 {
        debug!("All chunk embeddings coincide, keeping the first chunk");
        return Ok(Selection {
            k: 1,
            score: 0.0,
            picks: vec![0],
        });
    }

    let dataset = DatasetBase::from(data);
    let mut best: Option<Selection> = None;

    for k in 2..=max_k.min(distinct) {
        let model = KMeans::params(k)
            .max_n_iterations(MAX_ITERATIONS)
            .fit(&dataset)
            .map_err(|e| RecapError::external("clustering", e.to_string()))?;
        let labels: Array1<usize> = model.predict(dataset.records());

        let labelled = DatasetBase::new(dataset.records().view(), labels.clone());
        let score = match labelled.silhouette_score() {
            Ok(score) if score.is_finite() => score,
            Ok(_) | Err(_) => {
                debug!("k={} has no usable silhouette, skipped", k);
                continue;
            }
        };
        debug!("k={} silhouette={:.4}", k, score);

        // Ties keep the smaller k
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(Selection {
                k,
                score,
                picks: representatives(dataset.records(), &labels, model.centroids()),
            });
        }
    }

    best.ok_or_else(|| RecapError::external("clustering", "No cluster count produced a usable score"))
}

/// Index of the row nearest each centroid, sorted and de-duplicated
fn representatives(
    data: &Array2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
) -> Vec<usize> {
    let mut picks: Vec<usize> = centroids
        .axis_iter(Axis(0))
        .enumerate()
        .filter_map(|(cluster, centroid)| {
            labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == cluster)
                .map(|(i, _)| (i, squared_distance(data.row(i), centroid)))
                .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
                .map(|(i, _)| i)
        })
        .collect();

    picks.sort_unstable();
    picks.dedup();
    picks
}
