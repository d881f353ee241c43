// MatchService - bounded concurrent matching for async callers
//
// Matching is CPU-bound and synchronous, so each request runs on tokio's
// blocking pool. A semaphore caps how many matches run at once; requests
// beyond the cap wait for a permit instead of piling onto the pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::MatchError;
use crate::matcher::{SimilarityResult, VoiceMatcher};

/// One comparison submitted to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub reference_audio: Vec<u8>,
    pub reference_passphrase: String,
    pub probe_audio: Vec<u8>,
    pub probe_passphrase: String,
}

/// Runs independent matches concurrently against a shared matcher
#[derive(Clone)]
pub struct MatchService {
    matcher: Arc<VoiceMatcher>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl MatchService {
    /// Create a service allowing `max_concurrent` matches in flight (min 1)
    pub fn new(matcher: Arc<VoiceMatcher>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        tracing::info!(
            "[MatchService] Created with {} concurrent match slots",
            max_concurrent
        );
        Self {
            matcher,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Run one match once a slot is free
    pub async fn submit(&self, request: MatchRequest) -> Result<SimilarityResult, MatchError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| MatchError::WorkerFailed {
                reason: format!("match slots closed: {}", e),
            })?;

        let matcher = Arc::clone(&self.matcher);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            matcher.match_audio(
                &request.reference_audio,
                &request.reference_passphrase,
                &request.probe_audio,
                &request.probe_passphrase,
            )
        });

        match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                tracing::error!("[MatchService] Match worker failed: {}", join_err);
                Err(MatchError::WorkerFailed {
                    reason: join_err.to_string(),
                })
            }
        }
    }

    /// Run every request concurrently; results keep the input order
    pub async fn submit_all(
        &self,
        requests: Vec<MatchRequest>,
    ) -> Vec<Result<SimilarityResult, MatchError>> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let service = self.clone();
                tokio::spawn(async move { service.submit(request).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.unwrap_or_else(|join_err| {
                Err(MatchError::WorkerFailed {
                    reason: join_err.to_string(),
                })
            }));
        }
        results
    }
}
