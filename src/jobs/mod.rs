//! Bounded-lifetime registry for background analyses.
//!
//! An analysis kicked off asynchronously keeps running even if the caller
//! goes away, so its result still lands in the cache; the registry holds
//! the terminal state long enough for a later poll and then sweeps it.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Default retention for finished job records
pub const DEFAULT_JOB_TTL: Duration = Duration::from_secs(600);

/// Lifecycle of one background job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum JobState {
    Pending,
    Processing,
    Completed { result: serde_json::Value },
    Failed { error: String },
}

impl JobState {
    /// True once the job can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

/// One tracked job
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(flatten)]
    pub state: JobState,
    /// Creation time, unix milliseconds
    pub created_at: i64,
    /// Last state change, unix milliseconds
    pub updated_at: i64,
}

/// In-process job table with TTL-based cleanup of finished records
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<Mutex<HashMap<String, JobRecord>>>,
    ttl: Duration,
}

impl JobRegistry {
    /// Create a registry with the given record retention
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Register a new pending job, returning its id
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        let record = JobRecord {
            id: id.clone(),
            state: JobState::Pending,
            created_at: now,
            updated_at: now,
        };

        self.lock().insert(id.clone(), record);
        debug!(job_id = %id, "Job created");
        id
    }

    /// Move a job to a new state; unknown ids are ignored
    pub fn update(&self, id: &str, state: JobState) {
        let mut jobs = self.lock();
        if let Some(record) = jobs.get_mut(id) {
            record.state = state;
            record.updated_at = Utc::now().timestamp_millis();
        }
    }

    /// Snapshot of one job
    pub fn get(&self, id: &str) -> Option<JobRecord> {
        self.lock().get(id).cloned()
    }

    /// Number of tracked jobs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no jobs are tracked
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop terminal records older than the retention window.
    ///
    /// Returns how many records were removed. In-flight jobs are never
    /// swept regardless of age.
    pub fn sweep(&self) -> usize {
        let cutoff = Utc::now().timestamp_millis() - self.ttl.as_millis() as i64;
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, record| !record.state.is_terminal() || record.updated_at > cutoff);
        let removed = before - jobs.len();
        if removed > 0 {
            info!(removed, "Swept expired job records");
        }
        removed
    }

    /// Spawn a periodic sweep task; runs until the registry is dropped
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.sweep();
            }
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobRecord>> {
        self.jobs.lock().expect("job registry mutex poisoned")
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_TTL)
    }
}
