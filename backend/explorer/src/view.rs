//! View models handed to the front end, and the fetch-cycle boundary.
//!
//! A fetch cycle either publishes a complete [`AggregateView`] or a single
//! error state; there is no half-populated view. [`ViewStore`] tags each
//! cycle so that a slow, older cycle cannot overwrite a newer result.

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::classifier::{classify_all, Bucket, Buckets};
use crate::errors::{ExplorerError, Result};
use crate::projects::{detail_route, ProjectStatus, ProjectSummary};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch projects. Please try again later.";
pub const NOT_CONNECTED_MESSAGE: &str = "Connect wallet to see your projects.";

/// One project as rendered in a list or grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEntry {
    pub address: String,
    pub name: String,
    pub description: String,
    pub start_time: u64,
    pub end_time: u64,
    pub status: ProjectStatus,
    pub bucket: Bucket,
    pub route: String,
}

impl ProjectEntry {
    pub fn new(chain_id: u64, summary: ProjectSummary, bucket: Bucket) -> Self {
        Self {
            route: detail_route(chain_id, &summary.address),
            address: summary.address.to_string(),
            name: summary.name,
            description: summary.description,
            start_time: summary.start_time,
            end_time: summary.end_time,
            status: summary.status,
            bucket,
        }
    }

    /// `needle` must already be lower-cased.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateView {
    pub chain_id: u64,
    pub fetched_at: u64,
    pub total: usize,
    pub upcoming: Vec<ProjectEntry>,
    pub ongoing: Vec<ProjectEntry>,
    pub past: Vec<ProjectEntry>,
}

impl AggregateView {
    /// Classify a complete set of records fetched at `now`.
    pub fn from_records(chain_id: u64, records: Vec<ProjectSummary>, now: u64) -> Self {
        let buckets = classify_all(records, now);
        let total = buckets.len();
        let Buckets {
            upcoming,
            ongoing,
            past,
        } = buckets;
        let entries = |records: Vec<ProjectSummary>, bucket: Bucket| {
            records
                .into_iter()
                .map(|r| ProjectEntry::new(chain_id, r, bucket))
                .collect::<Vec<_>>()
        };

        let upcoming = entries(upcoming, Bucket::Upcoming);
        let ongoing = entries(ongoing, Bucket::Ongoing);
        let past = entries(past, Bucket::Past);
        Self {
            chain_id,
            fetched_at: now,
            total,
            upcoming,
            ongoing,
            past,
        }
    }

    /// Case-insensitive substring search over name and description.
    /// Buckets are kept as classified; only membership shrinks.
    pub fn filter(&self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        let keep = |entries: &[ProjectEntry]| {
            entries
                .iter()
                .filter(|e| e.matches(&needle))
                .cloned()
                .collect::<Vec<_>>()
        };
        let upcoming = keep(&self.upcoming);
        let ongoing = keep(&self.ongoing);
        let past = keep(&self.past);
        Self {
            chain_id: self.chain_id,
            fetched_at: self.fetched_at,
            total: upcoming.len() + ongoing.len() + past.len(),
            upcoming,
            ongoing,
            past,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// What the front end should render for a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    NotConnected { message: String },
    UnsupportedNetwork { chain_id: u64, message: String },
    Failed { message: String },
    Ready(AggregateView),
}

impl ViewState {
    /// Collapse a fetch cycle's outcome into one user-facing state,
    /// logging the underlying diagnostic.
    pub fn from_result(result: Result<AggregateView>) -> Self {
        match result {
            Ok(view) => {
                debug!("Fetch cycle produced {} projects", view.total);
                Self::Ready(view)
            }
            Err(ExplorerError::UnsupportedNetwork(chain_id)) => {
                warn!("Fetch requested for unsupported chain {chain_id}");
                Self::UnsupportedNetwork {
                    chain_id,
                    message: format!(
                        "Unsupported network (chain id {chain_id}). Please switch to a supported network."
                    ),
                }
            }
            Err(e) if e.is_invalid_input() => {
                debug!("No usable wallet for fetch cycle: {e}");
                Self::NotConnected {
                    message: NOT_CONNECTED_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                error!("Fetch cycle failed: {e}");
                Self::Failed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn filtered(&self, query: Option<&str>) -> Self {
        match (self, query) {
            (Self::Ready(view), Some(q)) => Self::Ready(view.filter(q)),
            _ => self.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Published view
// ─────────────────────────────────────────────────────────

/// Identifies one fetch cycle; later cycles carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CycleToken(u64);

struct Published {
    generation: u64,
    state: ViewState,
}

pub struct ViewStore {
    inner: RwLock<Published>,
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Published {
                generation: 0,
                state: ViewState::Loading,
            }),
        }
    }

    /// Start a new cycle. Any cycle still in flight becomes stale.
    ///
    /// The published state is left alone until the cycle publishes, so
    /// `Loading` is only ever seen before the first cycle completes.
    pub async fn begin(&self) -> CycleToken {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        CycleToken(inner.generation)
    }

    /// Publish a cycle's outcome; returns `false` if a newer cycle has begun.
    pub async fn publish(&self, token: CycleToken, state: ViewState) -> bool {
        let mut inner = self.inner.write().await;
        if token.0 != inner.generation {
            debug!(
                "Discarding result of cycle {} (current cycle is {})",
                token.0, inner.generation
            );
            return false;
        }
        inner.state = state;
        true
    }

    pub async fn snapshot(&self) -> ViewState {
        self.inner.read().await.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn summary(n: u8, name: &str, description: &str, start: u64, status: ProjectStatus) -> ProjectSummary {
        ProjectSummary {
            address: Address::from([n; 20]),
            name: name.to_string(),
            description: description.to_string(),
            start_time: start,
            end_time: start + 3600,
            status,
        }
    }

    fn sample_view() -> AggregateView {
        AggregateView::from_records(
            534351,
            vec![
                summary(1, "Beach Cleanup", "Collect plastic", NOW + 100, ProjectStatus::Active),
                summary(2, "Tree Planting", "Plant oaks on the BEACH road", NOW - 100, ProjectStatus::Active),
                summary(3, "Food Drive", "Winter meals", NOW - 100, ProjectStatus::Completed),
            ],
            NOW,
        )
    }

    #[test]
    fn view_splits_records_into_buckets() {
        let view = sample_view();
        assert_eq!(view.total, 3);
        assert_eq!(view.upcoming[0].name, "Beach Cleanup");
        assert_eq!(view.ongoing[0].name, "Tree Planting");
        assert_eq!(view.past[0].name, "Food Drive");
        assert_eq!(view.past[0].bucket, Bucket::Past);
        assert!(view.upcoming[0].route.starts_with("/p?chainId=534351&projectId=0x"));
    }

    #[test]
    fn filter_matches_name_or_description_case_insensitively() {
        let view = sample_view().filter("beach");
        assert_eq!(view.total, 2);
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.ongoing.len(), 1);
        assert!(view.past.is_empty());
    }

    #[test]
    fn filter_does_not_reclassify() {
        let view = sample_view().filter("food");
        assert_eq!(view.past.len(), 1);
        assert_eq!(view.past[0].bucket, Bucket::Past);
    }

    #[test]
    fn blank_filter_is_identity() {
        assert_eq!(sample_view().filter("   "), sample_view());
    }

    #[test]
    fn empty_view_is_ready_not_failed() {
        let state = ViewState::from_result(Ok(AggregateView::from_records(1, vec![], NOW)));
        match state {
            ViewState::Ready(view) => assert!(view.is_empty()),
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn errors_map_to_distinct_states() {
        assert!(matches!(
            ViewState::from_result(Err(ExplorerError::UnsupportedNetwork(5))),
            ViewState::UnsupportedNetwork { chain_id: 5, .. }
        ));
        assert!(matches!(
            ViewState::from_result(Err(ExplorerError::NotConnected)),
            ViewState::NotConnected { .. }
        ));
        assert!(matches!(
            ViewState::from_result(Err(ExplorerError::InvalidAddress("0x12".into()))),
            ViewState::NotConnected { .. }
        ));
        assert_eq!(
            ViewState::from_result(Err(ExplorerError::Decode("short".into()))),
            ViewState::Failed {
                message: FETCH_FAILED_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn state_serializes_with_tag() {
        let json = serde_json::to_value(ViewState::Failed {
            message: "x".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");

        let json = serde_json::to_value(ViewState::Ready(sample_view())).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["total"], 3);
        assert_eq!(json["ongoing"][0]["status"], "active");
    }

    #[tokio::test]
    async fn stale_cycle_is_discarded() {
        let store = ViewStore::new();
        let older = store.begin().await;
        let newer = store.begin().await;
        assert!(older < newer);

        assert!(store.publish(newer, ViewState::Ready(sample_view())).await);
        assert!(!store.publish(older, ViewState::Failed { message: "late".into() }).await);
        assert!(matches!(store.snapshot().await, ViewState::Ready(_)));
    }

    #[tokio::test]
    async fn loading_until_first_publish() {
        let store = ViewStore::new();
        store.begin().await;
        assert_eq!(store.snapshot().await, ViewState::Loading);
    }

    #[tokio::test]
    async fn ready_view_survives_next_cycle_until_publish() {
        let store = ViewStore::new();
        let first = store.begin().await;
        store.publish(first, ViewState::Ready(sample_view())).await;

        let second = store.begin().await;
        assert_eq!(store.snapshot().await, ViewState::Ready(sample_view()));

        let failed = ViewState::Failed {
            message: FETCH_FAILED_MESSAGE.to_string(),
        };
        assert!(store.publish(second, failed.clone()).await);
        assert_eq!(store.snapshot().await, failed);
    }
}
