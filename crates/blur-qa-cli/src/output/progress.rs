//! Terminal progress reporting for batch runs.

use blur_qa_core::{AnalysisResult, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// How progress is shown on stderr.
enum Display {
    /// Nothing at all.
    Silent,
    /// An indicatif bar; skip warnings are printed above it.
    Bar(ProgressBar),
    /// One line per flagged or skipped image.
    Lines,
}

/// [`ProgressSink`] writing to stderr.
pub struct ProgressReporter {
    display: Display,
}

impl ProgressReporter {
    /// Reporter that prints nothing.
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            display: Display::Silent,
        }
    }

    /// Reporter printing a line for each flagged or skipped image.
    #[must_use]
    pub const fn lines() -> Self {
        Self {
            display: Display::Lines,
        }
    }

    /// Reporter drawing a bar sized to `total` images, or a spinner when the
    /// count is unknown.
    #[must_use]
    pub fn bar(total: Option<usize>) -> Self {
        let bar = match total {
            Some(n) => ProgressBar::new(n as u64),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self {
            display: Display::Bar(bar),
        }
    }

    fn warn(&self, line: &str) {
        match &self.display {
            Display::Silent => {}
            Display::Bar(bar) => bar.println(line),
            Display::Lines => eprintln!("{line}"),
        }
    }
}

/// `"blurry, low contrast"` style label, or `None` for a clean image.
fn issue_label(result: &AnalysisResult) -> Option<String> {
    let flags: Vec<&str> = [
        (result.blurry, "blurry"),
        (result.low_contrast, "low contrast"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    (!flags.is_empty()).then(|| flags.join(", "))
}

impl ProgressSink for ProgressReporter {
    fn on_event(&self, event: ProgressEvent) {
        match (&self.display, event) {
            (Display::Silent, _) => {}
            (Display::Bar(bar), ProgressEvent::Started { path, .. }) => bar.set_message(path),
            (Display::Lines, ProgressEvent::Started { .. }) => {}
            (Display::Bar(bar), ProgressEvent::Scored { .. }) => bar.inc(1),
            (Display::Lines, ProgressEvent::Scored { result }) => {
                if let Some(label) = issue_label(&result) {
                    eprintln!("{}: {label}", result.input_path);
                }
            }
            (display, ProgressEvent::Skipped { path, reason }) => {
                if let Display::Bar(bar) = display {
                    bar.inc(1);
                }
                self.warn(&format!("WARN: Skipping {path}: {reason}"));
            }
            (Display::Bar(bar), ProgressEvent::Finished { summary }) => {
                bar.finish_with_message(format!(
                    "{} scored ({} blurry, {} low contrast), {} skipped",
                    summary.total, summary.blurry, summary.low_contrast, summary.skipped
                ));
            }
            (Display::Lines, ProgressEvent::Finished { .. }) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(blurry: bool, low_contrast: bool) -> AnalysisResult {
        AnalysisResult {
            blurry,
            clearness_score: 1.0,
            contrast_score: 0.5,
            input_path: "a.jpg".into(),
            low_contrast,
        }
    }

    #[test]
    fn test_issue_label() {
        assert_eq!(issue_label(&result(false, false)), None);
        assert_eq!(issue_label(&result(true, false)).as_deref(), Some("blurry"));
        assert_eq!(
            issue_label(&result(true, true)).as_deref(),
            Some("blurry, low contrast")
        );
    }

    #[test]
    fn test_bar_counts_scored_and_skipped() {
        let reporter = ProgressReporter::bar(Some(3));
        reporter.on_event(ProgressEvent::Scored {
            result: result(false, false),
        });
        reporter.on_event(ProgressEvent::Skipped {
            path: "b.jpg".into(),
            reason: "corrupt".into(),
        });

        let Display::Bar(bar) = &reporter.display else {
            panic!("expected a bar");
        };
        assert_eq!(bar.position(), 2);
        assert_eq!(bar.length(), Some(3));
    }

    #[test]
    fn test_silent_ignores_events() {
        let reporter = ProgressReporter::silent();
        reporter.on_event(ProgressEvent::Scored {
            result: result(true, true),
        });
        assert!(matches!(reporter.display, Display::Silent));
    }
}
