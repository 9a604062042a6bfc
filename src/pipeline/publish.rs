// src/pipeline/publish.rs

//! Selection and publication orchestrator.
//!
//! One cycle walks fetch → extract → filter against the seen-set → select
//! → publish → record. Exactly one publish attempt happens per cycle
//! regardless of how many unseen candidates exist; the interval is the
//! rate limit.

use std::fmt;

use log::{error, info, warn};
use rand::seq::SliceRandom;

use crate::error::{AppError, Result};
use crate::models::Candidate;
use crate::services::{Fetch, Publisher, extract_candidates};
use crate::storage::SeenStore;

/// How a publish cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new pin was published and recorded
    Published { id: String },
    /// Every extracted candidate was already published
    AllSeen,
    /// The page yielded no candidates
    NoCandidates,
    /// The page could not be fetched; nothing was attempted
    FetchFailed,
    /// The publish attempt failed; the candidate stays eligible
    PublishFailed { id: String },
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Published { id } => write!(f, "published pin {id}"),
            CycleOutcome::AllSeen => write!(f, "all candidates already published"),
            CycleOutcome::NoCandidates => write!(f, "no candidates found"),
            CycleOutcome::FetchFailed => write!(f, "fetch failed, cycle skipped"),
            CycleOutcome::PublishFailed { id } => write!(f, "publish failed for pin {id}"),
        }
    }
}

/// Orchestrates one publication cycle end to end.
pub struct PublishPipeline<F, P> {
    fetcher: F,
    publisher: P,
    store: SeenStore,
    search_url: String,
}

impl<F: Fetch, P: Publisher> PublishPipeline<F, P> {
    pub fn new(fetcher: F, publisher: P, store: SeenStore, search_url: String) -> Self {
        Self {
            fetcher,
            publisher,
            store,
            search_url,
        }
    }

    /// Run a single publish cycle.
    ///
    /// Recoverable failures (fetch, publish) end the cycle with an outcome
    /// instead of an error; only seen-set failures propagate.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let raw = match self.fetcher.fetch(&self.search_url).await {
            Ok(raw) => raw,
            Err(error) => {
                error!("failed to fetch {}: {error}", self.search_url);
                return Ok(CycleOutcome::FetchFailed);
            }
        };

        let mut candidates = extract_candidates(&raw);
        if candidates.is_empty() {
            info!("no pins found at {}", self.search_url);
            return Ok(CycleOutcome::NoCandidates);
        }

        // Random order makes "first unseen" a uniform random choice.
        candidates.shuffle(&mut rand::thread_rng());
        let total = candidates.len();

        let Some(candidate) = self.first_unseen(candidates).await? else {
            info!("all {total} candidates already published");
            return Ok(CycleOutcome::AllSeen);
        };

        info!("attempting to publish pin {}", candidate.id);
        match self.publisher.send_photo(&candidate.url, "").await {
            Ok(()) => {
                self.store.mark_published(&candidate.id).await?;
                Ok(CycleOutcome::Published { id: candidate.id })
            }
            Err(AppError::Permission(reason)) => {
                error!("publish rejected for pin {}: {reason}", candidate.id);
                let notice = format!(
                    "Cannot post to the channel: {reason}. \
                     Check that the bot is a member and has administrator rights."
                );
                if let Err(notify_error) = self.publisher.notify_admin(&notice).await {
                    warn!("failed to notify admin: {notify_error}");
                }
                Ok(CycleOutcome::PublishFailed { id: candidate.id })
            }
            Err(AppError::PublishApi(reason)) => {
                error!("publish failed for pin {}: {reason}", candidate.id);
                Ok(CycleOutcome::PublishFailed { id: candidate.id })
            }
            Err(other) => {
                error!(
                    "unexpected error publishing pin {} ({}): {other}",
                    candidate.id, candidate.url
                );
                Ok(CycleOutcome::PublishFailed { id: candidate.id })
            }
        }
    }

    /// First candidate whose id is not yet in the seen-set.
    async fn first_unseen(&self, candidates: Vec<Candidate>) -> Result<Option<Candidate>> {
        for candidate in candidates {
            if !self.store.is_published(&candidate.id).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}
