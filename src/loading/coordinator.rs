use bevy::platform::collections::HashMap;
use std::hash::Hash;

/// Errors surfaced by [`AssetLoadCoordinator`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// The asset collaborator reported a failure for this path.
    #[error("failed to load {path}: {reason}")]
    Failed { path: String, reason: String },

    /// The coordinator gave up waiting before this path settled.
    #[error("timed out waiting for {path}")]
    TimedOut { path: String },

    /// `register_expected` was called after a request had already settled.
    #[error("expected load count must be registered before any load settles")]
    AlreadyStarted,
}

/// What kind of asset a request fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    /// An image used as a material map or sprite.
    Texture,
    /// A glTF scene and everything it references.
    Model,
}

/// Completion state of one [`LoadRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum LoadStatus {
    Pending,
    Done,
    Failed(LoadError),
}

/// One outstanding asynchronous fetch of a named asset.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    /// Relative asset path, used for logging and failure reports.
    pub path: String,
    pub kind: LoadKind,
    pub status: LoadStatus,
}

/// Aggregate load progress, as shown by the loading overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadProgress {
    /// Requests settled so far (successes and failures).
    pub loaded: usize,
    /// Number of requests the coordinator waits for.
    pub total: usize,
}

impl LoadProgress {
    /// Horizontal offset of the slider thumb inside a track `track_width` wide.
    ///
    /// Starts at `-track_width` and reaches `0` exactly when every request has
    /// settled. An empty load set is reported as complete.
    pub fn slider_offset(&self, track_width: f32) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.loaded as f32 / self.total as f32 * track_width - track_width
    }

    /// Overlay caption, e.g. `Loading... 3/6`.
    pub fn label(&self) -> String {
        format!("Loading... {}/{}", self.loaded, self.total)
    }
}

/// Final report handed over when the ready transition fires.
#[derive(Clone, Debug, Default)]
pub struct LoadOutcome {
    /// Number of requests that completed successfully.
    pub loaded: usize,
    /// Paths that failed or timed out, with the reason.
    pub failed: Vec<LoadError>,
}

/// Tracks a declared set of asset loads and fires a single ready transition.
///
/// Keyed by whatever id the asset collaborator hands out; the Bevy glue uses
/// `UntypedAssetId`.
#[derive(Debug)]
pub struct AssetLoadCoordinator<K> {
    requests: HashMap<K, LoadRequest>,
    expected: Option<usize>,
    completed: usize,
    failed: usize,
    timeout: Option<f32>,
    fired: bool,
}

impl<K: Eq + Hash + Clone> AssetLoadCoordinator<K> {
    /// Creates an empty coordinator. `timeout` is in seconds of elapsed time as
    /// passed to [`Self::poll`]; `None` waits forever.
    pub fn new(timeout: Option<f32>) -> Self {
        Self {
            requests: HashMap::new(),
            expected: None,
            completed: 0,
            failed: 0,
            timeout,
            fired: false,
        }
    }

    /// Declares how many requests will eventually be tracked.
    ///
    /// Requests may be issued lazily, so the total cannot be inferred from
    /// what has been tracked so far.
    pub fn register_expected(&mut self, count: usize) -> Result<(), LoadError> {
        if self.completed + self.failed > 0 {
            return Err(LoadError::AlreadyStarted);
        }
        self.expected = Some(count);
        Ok(())
    }

    /// Records a new pending request. Re-tracking a known id is a no-op.
    pub fn track(&mut self, id: K, path: impl Into<String>, kind: LoadKind) {
        self.requests.entry(id).or_insert_with(|| LoadRequest {
            path: path.into(),
            kind,
            status: LoadStatus::Pending,
        });
    }

    /// Marks a pending request as done. Returns `false` for unknown or
    /// already settled ids.
    pub fn complete(&mut self, id: &K) -> bool {
        let Some(req) = self.requests.get_mut(id) else {
            return false;
        };
        if req.status != LoadStatus::Pending {
            return false;
        }
        req.status = LoadStatus::Done;
        self.completed += 1;
        true
    }

    /// Marks a pending request as failed and returns the recorded error.
    /// Returns `None` for unknown or already settled ids.
    pub fn fail(&mut self, id: &K, reason: impl Into<String>) -> Option<LoadError> {
        let req = self.requests.get_mut(id)?;
        if req.status != LoadStatus::Pending {
            return None;
        }
        let err = LoadError::Failed {
            path: req.path.clone(),
            reason: reason.into(),
        };
        req.status = LoadStatus::Failed(err.clone());
        self.failed += 1;
        Some(err)
    }

    /// Ids of requests that have not settled yet.
    pub fn pending(&self) -> impl Iterator<Item = &K> {
        self.requests
            .iter()
            .filter(|(_, r)| r.status == LoadStatus::Pending)
            .map(|(id, _)| id)
    }

    /// Number of tracked requests of the given kind.
    pub fn count(&self, kind: LoadKind) -> usize {
        self.requests.values().filter(|r| r.kind == kind).count()
    }

    /// Total the coordinator waits for: the registered count, or the number of
    /// tracked requests when nothing was registered.
    pub fn total(&self) -> usize {
        self.expected
            .unwrap_or(self.requests.len())
            .max(self.completed + self.failed)
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded: self.completed + self.failed,
            total: self.total(),
        }
    }

    /// `true` once the ready transition has fired.
    pub fn is_ready(&self) -> bool {
        self.fired
    }

    /// Checks for the ready transition. Returns `Some` exactly once: when every
    /// expected request has settled, or when `elapsed` passes the timeout, in
    /// which case every pending request is failed first.
    pub fn poll(&mut self, elapsed: f32) -> Option<LoadOutcome> {
        if self.fired {
            return None;
        }

        let timed_out = self.timeout.is_some_and(|t| elapsed >= t);
        if timed_out {
            for req in self.requests.values_mut() {
                if req.status == LoadStatus::Pending {
                    req.status = LoadStatus::Failed(LoadError::TimedOut {
                        path: req.path.clone(),
                    });
                    self.failed += 1;
                }
            }
        } else if self.completed + self.failed < self.total() {
            return None;
        }

        self.fired = true;
        let failed = self
            .requests
            .values()
            .filter_map(|r| match &r.status {
                LoadStatus::Failed(err) => Some(err.clone()),
                _ => None,
            })
            .collect();
        Some(LoadOutcome {
            loaded: self.completed,
            failed,
        })
    }
}
