use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::fetcher::{Fetcher, HttpError, Page};

/// Fetches many URLs with at most `workers` requests in flight.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// One result per URL, in the order of `urls`, whatever order the requests finish in.
    pub async fn fetch_all(
        &self,
        urls: Vec<String>,
        timeout: Duration,
    ) -> Vec<(String, Result<Page, HttpError>)> {
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls.iter().cloned() {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                // the semaphore is never closed, so acquire cannot fail
                let _permit = semaphore.acquire_owned().await.ok();
                fetcher.fetch(&url, timeout).await
            });

            handles.push(handle);
        }

        let joined = futures::future::join_all(handles).await;

        urls.into_iter()
            .zip(joined)
            .map(|(url, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    tracing::error!("Task join error: {}", e);
                    Err(HttpError::Task(e.to_string()))
                });
                (url, result)
            })
            .collect()
    }
}
