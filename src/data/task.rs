use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use poll_promise::Promise;

use super::loader::{self, LoadError, ResourceSource};
use super::model::{Dataset, DatasetKind};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared flag between a [`LoadTask`] and its worker thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), LoadError> {
        if self.is_cancelled() {
            Err(LoadError::Cancelled)
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Background load
// ---------------------------------------------------------------------------

/// One in-flight load of one dataset, running on its own thread.
///
/// Dropping the task cancels it: the worker stops at its next checkpoint and
/// whatever it produced is never delivered.
pub struct LoadTask {
    kind: DatasetKind,
    source: ResourceSource,
    cancel: CancelToken,
    promise: Promise<Result<Dataset, LoadError>>,
}

impl LoadTask {
    pub fn spawn(kind: DatasetKind, source: ResourceSource) -> Self {
        Self::spawn_with_token(kind, source, CancelToken::default())
    }

    pub fn spawn_with_token(
        kind: DatasetKind,
        source: ResourceSource,
        cancel: CancelToken,
    ) -> Self {
        let worker_source = source.clone();
        let worker_cancel = cancel.clone();
        let promise = Promise::spawn_thread(format!("load-{kind}"), move || {
            worker_cancel.check()?;
            let bytes = loader::fetch(&worker_source)?;
            worker_cancel.check()?;
            let dataset = loader::parse_dataset(&worker_source.extension(), bytes)?;
            worker_cancel.check()?;
            Ok(dataset)
        });

        log::debug!("started {kind} load from {source}");

        Self {
            kind,
            source,
            cancel,
            promise,
        }
    }

    pub fn source(&self) -> &ResourceSource {
        &self.source
    }

    /// Take the result if the worker has finished. A finished task yields its
    /// result exactly once; afterwards it reports `Cancelled`.
    pub fn poll(&mut self) -> Option<Result<Dataset, LoadError>> {
        let result = self.promise.ready_mut()?;
        Some(std::mem::replace(result, Err(LoadError::Cancelled)))
    }

    /// Block until the worker finishes.
    #[cfg(test)]
    pub fn wait(mut self) -> Result<Dataset, LoadError> {
        self.promise.block_until_ready_mut();
        self.poll().unwrap_or(Err(LoadError::Cancelled))
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        if self.promise.ready().is_none() {
            log::debug!("cancelling pending {} load from {}", self.kind, self.source);
        }
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_json(dir: &tempfile::TempDir, body: &str) -> ResourceSource {
        let path = dir.path().join("set.json");
        std::fs::write(&path, body).unwrap();
        ResourceSource::File(path)
    }

    #[test]
    fn completed_task_yields_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_json(&dir, r#"[{"data":[1,2],"index":"A"}]"#);

        let task = LoadTask::spawn(DatasetKind::Test, source.clone());
        assert_eq!(task.source(), &source);

        let ds = task.wait().unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn result_is_taken_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_json(&dir, "[]");

        let mut task = LoadTask::spawn(DatasetKind::Train, source);
        task.promise.block_until_ready();
        assert!(matches!(task.poll(), Some(Ok(_))));
        assert!(matches!(task.poll(), Some(Err(LoadError::Cancelled))));
    }

    #[test]
    fn cancelled_task_delivers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_json(&dir, r#"[{"data":[1],"index":0}]"#);

        let token = CancelToken::default();
        token.cancel();
        let task = LoadTask::spawn_with_token(DatasetKind::Test, source, token);
        assert!(matches!(task.wait(), Err(LoadError::Cancelled)));
    }

    #[test]
    fn dropping_task_sets_cancel_flag() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_json(&dir, "[]");

        let token = CancelToken::default();
        let task = LoadTask::spawn_with_token(DatasetKind::Test, source, token.clone());
        assert!(!token.is_cancelled());
        drop(task);
        assert!(token.is_cancelled());
    }

    #[test]
    fn load_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = ResourceSource::File(dir.path().join("absent.json"));
        let task = LoadTask::spawn(DatasetKind::Train, source);
        assert!(matches!(task.wait(), Err(LoadError::Io { .. })));
    }
}
