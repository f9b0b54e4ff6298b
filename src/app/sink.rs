//! Reporting channel for non-fatal traversal errors.

use crate::app::error::ScanError;
use std::sync::Mutex;

/// Receives non-fatal scan errors without interrupting the traversal.
///
/// Sinks may be shared between scans running on different threads.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: ScanError);
}

impl<F> ErrorSink for F
where
    F: Fn(ScanError) + Send + Sync,
{
    fn report(&self, error: ScanError) {
        self(error)
    }
}

/// Accumulates reports for inspection once scanning is done.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<ScanError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_reports(self) -> Vec<ScanError> {
        self.reports
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScanError>> {
        // A panic elsewhere must not lose the reports gathered so far.
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, error: ScanError) {
        log::debug!("scan report: {}", error);
        self.lock().push(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::ScanErrorKind;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn not_found(p: &str) -> ScanError {
        ScanError::NotFound {
            path: PathBuf::from(p),
        }
    }

    #[test]
    fn test_collecting_sink_keeps_reports() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());
        sink.report(not_found("/a"));
        sink.report(not_found("/b"));
        assert_eq!(sink.len(), 2);

        let reports = sink.into_reports();
        assert_eq!(reports[0].kind(), ScanErrorKind::NotFound);
        assert_eq!(reports[1].path(), Some(PathBuf::from("/b").as_path()));
    }

    #[test]
    fn test_closure_sink() {
        let count = AtomicUsize::new(0);
        let sink = |_: ScanError| {
            count.fetch_add(1, Ordering::SeqCst);
        };
        sink.report(not_found("/a"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_collecting_sink_across_threads() {
        let sink = CollectingSink::new();
        std::thread::scope(|s| {
            for i in 0..4 {
                let sink = &sink;
                s.spawn(move || sink.report(not_found(&format!("/{}", i))));
            }
        });
        assert_eq!(sink.len(), 4);
    }
}
