//! JSON report adapter.
//!
//! Collects per-image records while the batch runs and writes the whole
//! report once at the end, optionally exporting a rendered blur map per
//! image along the way.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use blur_qa_core::{pretty_blur_map, Analysis, AnalysisResult, BatchSummary, ResultOutput};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, warn};

/// Suffix appended to the image stem for exported blur maps.
pub const BLUR_MAP_SUFFIX: &str = "_blur_map.png";

/// Top-level report document. Fields are declared in key order.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// RFC 3339 UTC time the report was produced.
    pub generated_at: &'a str,
    /// Directory that was scanned.
    pub input_dir: &'a str,
    /// One record per analysed image.
    pub results: &'a [AnalysisResult],
    /// Batch counts and ratios.
    pub summary: &'a BatchSummary,
    /// Blur threshold the batch ran with.
    pub threshold: f64,
}

/// Serializes `value` as JSON with 4-space indentation and a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_pretty_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    let mut ser = Serializer::with_formatter(&mut *writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    writeln!(writer)?;
    Ok(())
}

/// Fails unless `path` has a `.json` extension.
///
/// # Errors
///
/// Returns an error naming the path when the extension is missing or different.
pub fn ensure_json_path(path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(())
    } else {
        anyhow::bail!("Report path must end in .json: {}", path.display())
    }
}

/// Where the finished report goes.
enum Destination {
    /// Written to a sibling temp file, then renamed over `path`.
    File(PathBuf),
    /// Written straight to a caller-supplied writer.
    Writer(Mutex<Box<dyn Write + Send>>),
}

/// Blur map export settings plus the file names handed out so far.
struct BlurMapExport {
    dir: PathBuf,
    input_root: PathBuf,
    claimed: Mutex<HashSet<PathBuf>>,
}

impl BlurMapExport {
    /// Picks a file for the map of `input_path`.
    ///
    /// Subdirectories of the input root are mirrored under `dir`. A name
    /// already taken during this run gets a numeric suffix.
    fn target_for(&self, input_path: &str) -> Result<PathBuf> {
        let input = Path::new(input_path);
        let relative = input.strip_prefix(&self.input_root).unwrap_or(input);
        let parent = relative
            .parent()
            .filter(|_| relative != input)
            .map_or_else(|| self.dir.clone(), |p| self.dir.join(p));
        let stem = relative
            .file_stem()
            .map_or_else(|| "image".into(), |s| s.to_string_lossy());

        let mut claimed = self
            .claimed
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        let mut candidate = parent.join(format!("{stem}{BLUR_MAP_SUFFIX}"));
        let mut n = 2;
        while !claimed.insert(candidate.clone()) {
            candidate = parent.join(format!("{stem}_{n}{BLUR_MAP_SUFFIX}"));
            n += 1;
        }
        drop(claimed);

        if n > 2 {
            warn!(
                "Blur map name for {input_path} already used, writing {}",
                candidate.display()
            );
        }
        Ok(candidate)
    }
}

/// Report output adapter.
pub struct ReportOutput {
    destination: Destination,
    records: Mutex<Vec<AnalysisResult>>,
    blur_maps: Option<BlurMapExport>,
}

impl ReportOutput {
    /// Report that will be written to `path` by [`write_report`](Self::write_report).
    ///
    /// Nothing is written to `path` until then, so an aborted run leaves any
    /// previous report in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a `.json` file or its directory
    /// cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        ensure_json_path(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(Self::with_destination(Destination::File(path.to_path_buf())))
    }

    /// Report written to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self::with_destination(Destination::Writer(Mutex::new(writer)))
    }

    const fn with_destination(destination: Destination) -> Self {
        Self {
            destination,
            records: Mutex::new(Vec::new()),
            blur_maps: None,
        }
    }

    /// Also render each blur map into `dir`, mirroring the layout of the
    /// images below `input_root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_blur_maps(mut self, dir: PathBuf, input_root: &Path) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create blur map directory: {}", dir.display()))?;
        self.blur_maps = Some(BlurMapExport {
            dir,
            input_root: input_root.to_path_buf(),
            claimed: Mutex::new(HashSet::new()),
        });
        Ok(self)
    }

    /// Records collected so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the record lock is poisoned.
    pub fn records(&self) -> Result<Vec<AnalysisResult>> {
        Ok(self
            .records
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
            .clone())
    }

    /// Writes the report envelope around the collected records.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write_report(
        &self,
        generated_at: &str,
        input_dir: &str,
        threshold: f64,
        summary: &BatchSummary,
    ) -> Result<()> {
        let records = self.records()?;
        let report = Report {
            generated_at,
            input_dir,
            results: &records,
            summary,
            threshold,
        };

        match &self.destination {
            Destination::File(path) => write_file_atomically(path, &report),
            Destination::Writer(writer) => {
                let mut writer = writer
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
                write_pretty_json(&mut *writer, &report)?;
                writer.flush()?;
                Ok(())
            }
        }
    }

    fn export_blur_map(export: &BlurMapExport, analysis: &Analysis) -> Result<()> {
        let path = export.target_for(&analysis.result.input_path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        if path.exists() {
            debug!("Replacing blur map from an earlier run: {}", path.display());
        }
        pretty_blur_map(&analysis.blur_map)
            .save(&path)
            .with_context(|| format!("Failed to write blur map: {}", path.display()))?;
        Ok(())
    }
}

/// Writes `report` next to `path` and renames it into place.
fn write_file_atomically(path: &Path, report: &Report<'_>) -> Result<()> {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    let staging = PathBuf::from(staging);

    let file = File::create(&staging)
        .with_context(|| format!("Failed to create report: {}", staging.display()))?;
    let mut writer = io::BufWriter::new(file);
    write_pretty_json(&mut writer, report)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report: {}", staging.display()))?;
    drop(writer);

    std::fs::rename(&staging, path)
        .with_context(|| format!("Failed to move report into place: {}", path.display()))?;
    Ok(())
}

impl ResultOutput for ReportOutput {
    fn write(&self, analysis: &Analysis) -> Result<()> {
        if let Some(export) = &self.blur_maps {
            Self::export_blur_map(export, analysis)?;
        }
        self.records
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
            .push(analysis.result.clone());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        match &self.destination {
            Destination::File(_) => Ok(()),
            Destination::Writer(writer) => {
                writer
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?
                    .flush()?;
                Ok(())
            }
        }
    }
}
