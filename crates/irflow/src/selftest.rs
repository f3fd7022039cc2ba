//! Export self-tests: exercise the encoder and both download triggers without saving anything.

use crate::data_url::Blob;
use crate::download::{DownloadMode, Downloads};
use crate::encode::{ImageEncoder, RasterOptions, VectorOptions};
use irflow_render::Region;
use serde::Serialize;
use std::fmt;

pub const PNG_TEST: &str = "T1: toPng returns data URL";
pub const SVG_TEST: &str = "T2: toSvg returns data URL";
pub const DOWNLOAD_TEST: &str = "T3: download helpers (dry-run)";
pub const UNEXPECTED_ERROR: &str = "Unexpected error in tests";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub name: String,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    fn check(name: &str, pass: bool) -> Self {
        Self {
            name: name.to_string(),
            pass,
            error: None,
        }
    }

    fn failed(name: &str, error: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            pass: false,
            error: Some(error.to_string()),
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pass {
            write!(f, "{}: PASS", self.name)
        } else {
            write!(f, "{}: FAIL", self.name)?;
            if let Some(err) = &self.error {
                write!(f, " - {err}")?;
            }
            Ok(())
        }
    }
}

/// Results in run order, one line each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfTestReport(pub Vec<TestResult>);

impl SelfTestReport {
    pub fn all_passed(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|r| r.pass)
    }
}

impl fmt::Display for SelfTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.0 {
            writeln!(f, "{r}")?;
        }
        Ok(())
    }
}

fn run_checks(
    encoder: &dyn ImageEncoder,
    downloads: &Downloads,
    results: &mut Vec<TestResult>,
) -> Result<(), Box<dyn std::error::Error>> {
    let png_region = Region::labeled("png-test", "png-test", 120.0, 60.0).with_background("#eee");
    let raster = RasterOptions {
        cache_bust: true,
        ..Default::default()
    };
    let png = encoder.to_png(&png_region, &raster)?;
    results.push(TestResult::check(
        PNG_TEST,
        png.starts_with("data:image/png"),
    ));

    let svg_region = Region::labeled("svg-test", "svg-test", 80.0, 40.0);
    let svg = encoder.to_svg(&svg_region, &VectorOptions { cache_bust: true })?;
    results.push(TestResult::check(
        SVG_TEST,
        svg.starts_with("data:image/svg+xml"),
    ));

    let r1 = downloads.download_data_url(
        "data:text/plain;base64,SGVsbG8=",
        "test.txt",
        DownloadMode::PreviewOnly,
    )?;
    let r2 = downloads.download_blob(
        Blob::new("text/plain", b"hello".to_vec()),
        "test.txt",
        DownloadMode::PreviewOnly,
    )?;
    results.push(TestResult::check(
        DOWNLOAD_TEST,
        !r1.is_empty() && !r2.is_empty(),
    ));
    Ok(())
}

/// Runs the three export checks in order.
///
/// The first error stops the run; results recorded so far are kept and an
/// [`UNEXPECTED_ERROR`] entry carrying the message is appended.
pub fn run_self_tests(encoder: &dyn ImageEncoder, downloads: &Downloads) -> Vec<TestResult> {
    let mut results = Vec::with_capacity(3);
    if let Err(err) = run_checks(encoder, downloads, &mut results) {
        tracing::warn!(error = %err, "self-tests aborted");
        results.push(TestResult::failed(UNEXPECTED_ERROR, err));
    }
    let passed = results.iter().filter(|r| r.pass).count();
    tracing::info!(passed, total = results.len(), "self-tests finished");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::ObjectUrlStore;
    use crate::download::testing::RecordingSaveTarget;
    use crate::encode::{EncodeError, ResvgEncoder};
    use std::sync::Arc;

    fn downloads() -> (Arc<RecordingSaveTarget>, Downloads) {
        let target = Arc::new(RecordingSaveTarget::default());
        let d = Downloads::new(target.clone(), Arc::new(ObjectUrlStore::default()));
        (target, d)
    }

    struct BrokenSvg;

    impl ImageEncoder for BrokenSvg {
        fn to_png(&self, _: &Region, _: &RasterOptions) -> crate::encode::Result<String> {
            Ok("data:image/png;base64,AA==".to_string())
        }

        fn to_svg(&self, _: &Region, _: &VectorOptions) -> crate::encode::Result<String> {
            Err(EncodeError::Backend("boom".to_string()))
        }
    }

    struct WrongMime;

    impl ImageEncoder for WrongMime {
        fn to_png(&self, _: &Region, _: &RasterOptions) -> crate::encode::Result<String> {
            Ok("data:image/jpeg;base64,AA==".to_string())
        }

        fn to_svg(&self, _: &Region, _: &VectorOptions) -> crate::encode::Result<String> {
            Ok("data:image/svg+xml;base64,AA==".to_string())
        }
    }

    /// Remembers what each call was asked to encode.
    #[derive(Default)]
    struct Recording {
        calls: std::sync::Mutex<Vec<(String, String, bool)>>,
    }

    impl ImageEncoder for Recording {
        fn to_png(
            &self,
            region: &Region,
            options: &RasterOptions,
        ) -> crate::encode::Result<String> {
            let call = (region.id.clone(), region.body().to_string(), options.cache_bust);
            self.calls.lock().unwrap().push(call);
            Ok("data:image/png;base64,AA==".to_string())
        }

        fn to_svg(
            &self,
            region: &Region,
            options: &VectorOptions,
        ) -> crate::encode::Result<String> {
            let call = (region.id.clone(), region.body().to_string(), options.cache_bust);
            self.calls.lock().unwrap().push(call);
            Ok("data:image/svg+xml;base64,AA==".to_string())
        }
    }

    #[test]
    fn throwaway_elements_are_labeled_and_cache_busted() {
        let (_, d) = downloads();
        let encoder = Recording::default();
        run_self_tests(&encoder, &d);
        let calls = encoder.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        for ((id, body, cache_bust), label) in calls.iter().zip(["png-test", "svg-test"]) {
            assert_eq!(id, label);
            assert!(body.contains(&format!(">{label}</text>")), "{body}");
            assert!(*cache_bust);
        }
    }

    #[test]
    fn healthy_run_passes_all_three_in_order() {
        let (target, d) = downloads();
        let results = run_self_tests(&ResvgEncoder::new(), &d);
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, [PNG_TEST, SVG_TEST, DOWNLOAD_TEST]);
        assert!(results.iter().all(|r| r.pass && r.error.is_none()));
        assert!(target.saved().is_empty());
    }

    #[test]
    fn encoder_failure_stops_the_run() {
        let (_, d) = downloads();
        let results = run_self_tests(&BrokenSvg, &d);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], TestResult::check(PNG_TEST, true));
        assert_eq!(results[1].name, UNEXPECTED_ERROR);
        assert!(!results[1].pass);
        assert_eq!(results[1].error.as_deref(), Some("boom"));
    }

    #[test]
    fn wrong_prefix_is_a_plain_failure() {
        let (_, d) = downloads();
        let results = run_self_tests(&WrongMime, &d);
        assert_eq!(results.len(), 3);
        assert!(!results[0].pass);
        assert_eq!(results[0].error, None);
        assert!(results[1].pass && results[2].pass);
    }

    #[test]
    fn report_lines() {
        let report = SelfTestReport(vec![
            TestResult::check(PNG_TEST, true),
            TestResult::failed(UNEXPECTED_ERROR, "boom"),
        ]);
        assert_eq!(
            report.to_string(),
            "T1: toPng returns data URL: PASS\nUnexpected error in tests: FAIL - boom\n"
        );
        assert!(!report.all_passed());
        assert!(!SelfTestReport::default().all_passed());
    }
}
