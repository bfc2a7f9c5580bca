//! In-memory implementations of the core ports.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use blur_qa_core::{
    Analysis, AnalysisResult, BatchSummary, ImageInfo, ImageSource, LoadError, ProgressEvent,
    ProgressSink, ResultOutput,
};

/// Append-only log shared between a mock and the test holding it.
#[derive(Debug)]
struct Recorder<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Recorder<T> {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        // A panicking test thread must not hide what was recorded.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, item: T) {
        self.lock().push(item);
    }

    fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Image source backed by a fixed list.
///
/// Items can be decoded images or load failures; both are yielded in the
/// order they were added.
pub struct MockImageSource {
    items: Vec<Result<ImageInfo, (String, String)>>,
    iterations: Recorder<()>,
}

impl MockImageSource {
    /// Source yielding `images` in order.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            items: images.into_iter().map(Ok).collect(),
            iterations: Recorder::new(),
        }
    }

    /// Source yielding nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Appends `path`, which fails to load with `reason`.
    #[must_use]
    pub fn with_load_error(mut self, path: impl Into<String>, reason: impl Into<String>) -> Self {
        self.items.push(Err((path.into(), reason.into())));
        self
    }

    /// How many times `images()` has been called.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iterations.len()
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadError>> + Send + '_> {
        self.iterations.push(());
        Box::new(self.items.iter().map(|item| match item {
            Ok(info) => Ok(info.clone()),
            Err((path, reason)) => Err(LoadError::new(path, anyhow::anyhow!("{reason}"))),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Output that keeps every record and blur map size it receives.
pub struct MockResultOutput {
    results: Recorder<AnalysisResult>,
    blur_map_sizes: Recorder<(u32, u32)>,
    flushes: Recorder<()>,
    fail_writes: bool,
}

impl MockResultOutput {
    /// Output accepting every write.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Recorder::new(),
            blur_map_sizes: Recorder::new(),
            flushes: Recorder::new(),
            fail_writes: false,
        }
    }

    /// Output whose `write` always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Records written so far.
    #[must_use]
    pub fn results(&self) -> Vec<AnalysisResult> {
        self.results.snapshot()
    }

    /// `(width, height)` of every blur map written so far.
    #[must_use]
    pub fn blur_map_sizes(&self) -> Vec<(u32, u32)> {
        self.blur_map_sizes.snapshot()
    }

    /// How many times `flush()` has been called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushes.len()
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, analysis: &Analysis) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("mock write failure");
        }
        self.results.push(analysis.result.clone());
        self.blur_map_sizes.push(analysis.blur_map.dimensions());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.flushes.push(());
        Ok(())
    }
}

/// Progress sink that keeps every event.
pub struct MockProgressSink {
    events: Recorder<ProgressEvent>,
}

impl MockProgressSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Recorder::new(),
        }
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.snapshot()
    }

    fn count(&self, pred: fn(&ProgressEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    /// Number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Number of `Scored` events.
    #[must_use]
    pub fn scored_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Scored { .. }))
    }

    /// Number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// Summary carried by the `Finished` event, if it arrived.
    #[must_use]
    pub fn finished_summary(&self) -> Option<BatchSummary> {
        self.events.lock().iter().find_map(|e| match e {
            ProgressEvent::Finished { summary } => Some(*summary),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events.push(event);
    }
}
