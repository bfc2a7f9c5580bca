//! Batch driver tests using mock ports.

#![allow(clippy::expect_used, clippy::float_cmp)]

use blur_qa_core::{run_batch, Analyzer, AnalyzerConfig, BlurConfig, ImageOutcome, NoProgress};
use blur_qa_test_support::{
    MockImageSource, MockProgressSink, MockResultOutput, SyntheticImageBuilder,
};

fn finished_counts(progress: &MockProgressSink) -> Option<(usize, usize)> {
    progress.finished_summary().map(|s| (s.total, s.skipped))
}

#[test]
fn test_batch_scores_every_image_in_order() {
    let source = MockImageSource::new(vec![
        SyntheticImageBuilder::checkerboard(64, 64),
        SyntheticImageBuilder::uniform_gray(64, 64, 128),
    ]);
    let output = MockResultOutput::new();
    let progress = MockProgressSink::new();

    let report = run_batch(&source, &Analyzer::default(), &output, &progress).expect("batch");

    let results = output.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].input_path, "synthetic://checkerboard");
    assert!(!results[0].blurry);
    assert_eq!(results[1].input_path, "synthetic://uniform_gray");
    assert!(results[1].blurry);
    assert!(results[1].low_contrast);

    assert_eq!(report.results().count(), 2);
    assert_eq!(output.flush_count(), 1);
    assert_eq!(progress.started_count(), 2);
    assert_eq!(progress.scored_count(), 2);
    assert_eq!(finished_counts(&progress), Some((2, 0)));
}

#[test]
fn test_bad_images_are_skipped_and_batch_continues() {
    let source = MockImageSource::new(vec![
        SyntheticImageBuilder::gray_alpha(16, 16),
        SyntheticImageBuilder::checkerboard(32, 32),
    ])
    .with_load_error("shots/broken.jpg", "corrupt header");
    let output = MockResultOutput::new();
    let progress = MockProgressSink::new();

    let report = run_batch(&source, &Analyzer::default(), &output, &progress).expect("batch");

    assert_eq!(output.results().len(), 1);
    assert_eq!(report.skipped(), 2);
    assert_eq!(progress.skipped_count(), 2);
    assert_eq!(finished_counts(&progress), Some((1, 2)));

    match &report.outcomes[0] {
        ImageOutcome::Skipped { path, reason } => {
            assert_eq!(path, "synthetic://gray_alpha");
            assert!(reason.contains("channel"), "unexpected reason: {reason}");
        }
        other => panic!("expected skip, got {other:?}"),
    }
    match &report.outcomes[2] {
        ImageOutcome::Skipped { path, reason } => {
            assert_eq!(path, "shots/broken.jpg");
            assert_eq!(reason, "corrupt header");
        }
        other => panic!("expected skip, got {other:?}"),
    }
}

#[test]
fn test_summary_counts_analyzed_images_only() {
    let source = MockImageSource::new(vec![
        SyntheticImageBuilder::checkerboard(32, 32),
        SyntheticImageBuilder::uniform_gray(32, 32, 10),
        SyntheticImageBuilder::uniform_gray(32, 32, 200),
        SyntheticImageBuilder::horizontal_gradient(32, 32),
    ])
    .with_load_error("e.png", "unreadable");
    let output = MockResultOutput::new();

    let report = run_batch(&source, &Analyzer::default(), &output, &NoProgress).expect("batch");
    let summary = report.summary();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.blurry, 3);
    assert_eq!(summary.blurry_ratio, 0.75);
    assert_eq!(summary.low_contrast, 2);
    assert_eq!(summary.low_contrast_ratio, 0.5);
}

#[test]
fn test_empty_batch() {
    let source = MockImageSource::empty();
    let output = MockResultOutput::new();
    let progress = MockProgressSink::new();

    let report = run_batch(&source, &Analyzer::default(), &output, &progress).expect("batch");

    assert!(report.outcomes.is_empty());
    assert_eq!(report.summary().blurry_ratio, 0.0);
    assert_eq!(output.flush_count(), 1);
    assert_eq!(finished_counts(&progress), Some((0, 0)));
}

#[test]
fn test_output_failure_aborts_batch() {
    let source = MockImageSource::new(vec![SyntheticImageBuilder::checkerboard(16, 16)]);
    let output = MockResultOutput::failing();

    let err = run_batch(&source, &Analyzer::default(), &output, &NoProgress)
        .expect_err("write failure must propagate");
    assert!(err.to_string().contains("mock write failure"));
}

#[test]
fn test_threshold_changes_classification() {
    let image = SyntheticImageBuilder::blurred_checkerboard(64, 64, 2.0);
    let lenient = Analyzer::new(AnalyzerConfig {
        blur: BlurConfig { threshold: 5.0 },
        ..Default::default()
    });
    let strict = Analyzer::new(AnalyzerConfig {
        blur: BlurConfig {
            threshold: f64::MAX,
        },
        ..Default::default()
    });

    let output = MockResultOutput::new();
    let source = MockImageSource::new(vec![image]);
    run_batch(&source, &lenient, &output, &NoProgress).expect("lenient");
    run_batch(&source, &strict, &output, &NoProgress).expect("strict");

    let results = output.results();
    assert_eq!(results[0].clearness_score, results[1].clearness_score);
    assert!(!results[0].blurry);
    assert!(results[1].blurry);
    assert_eq!(source.iteration_count(), 2);
}

#[test]
fn test_blur_maps_follow_resize() {
    let source = MockImageSource::new(vec![SyntheticImageBuilder::checkerboard(80, 40)]);
    let output = MockResultOutput::new();
    let analyzer = Analyzer::new(AnalyzerConfig {
        resize: Some(blur_qa_core::ResizeConfig {
            expected_pixels: 800,
        }),
        ..Default::default()
    });

    run_batch(&source, &analyzer, &output, &NoProgress).expect("batch");

    assert_eq!(output.blur_map_sizes(), vec![(40, 20)]);
}
