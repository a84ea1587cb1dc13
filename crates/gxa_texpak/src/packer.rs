//! Archive build orchestration.
//!
//! The [`Packer`] runs the full pipeline:
//!
//! 1. Select which candidate files to pack ([`select_textures`]).
//! 2. Turn every selected job into a [`TextureRecord`]: parse the name, decode
//!    the image(s), convert to tiled RGBA8 and gzip. With parallel conversion
//!    enabled this step runs on the rayon thread pool.
//! 3. Append the records in selection order through a single [`ArchiveWriter`].
//! 4. Finalize the archive (lookup table and header patch).
//!
//! The first error aborts the run. [`Packer::pack_directory`] writes to a
//! temporary file next to the output and only moves it into place on success.

use std::io::{BufWriter, Seek, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;

use crate::archive::{ArchiveHeader, ArchiveWriter};
use crate::error::{Error, Result};
use crate::pixels::{ImageLoader, PngLoader};
use crate::record::TextureRecord;
use crate::selector::{collect_candidates, select_textures, Selection, TextureJob};

/// Progress information emitted while packing.
///
/// `current`/`total` count textures and are only meaningful during
/// [`Converting`](PackStage::Converting) and [`Writing`](PackStage::Writing).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackProgress {
    pub stage: PackStage,
    /// File name of the texture just handled.
    pub current_file: Option<String>,
    /// 1-based count of textures handled in this stage.
    pub current: u32,
    pub total: u32,
}

/// Stages of a pack run, emitted in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PackStage {
    Selecting,
    Converting,
    Writing,
    Finalizing,
    Complete,
}

/// Summary returned after an archive is written.
#[derive(Debug, Clone)]
pub struct PackSummary {
    pub entries_added: u32,
    /// `_a.png` files that were found but not paired with any `_rgb.png`.
    pub orphaned_alpha: Vec<Utf8PathBuf>,
    pub table_offset: u32,
    pub archive_size: u64,
    pub build_time: Duration,
}

type ProgressCallback = Arc<dyn Fn(PackProgress) + Send + Sync>;

/// Builds `GXA1` archives from texture dumps.
///
/// Configure with [`with_progress`](Self::with_progress),
/// [`with_parallel_conversion`](Self::with_parallel_conversion) and
/// [`with_loader`](Self::with_loader), then call
/// [`pack_directory`](Self::pack_directory) or [`pack_files`](Self::pack_files).
pub struct Packer {
    header: ArchiveHeader,
    loader: Arc<dyn ImageLoader>,
    parallel: bool,
    progress_callback: Option<ProgressCallback>,
}

impl Packer {
    pub fn new(header: ArchiveHeader) -> Self {
        Self {
            header,
            loader: Arc::new(PngLoader),
            parallel: false,
            progress_callback: None,
        }
    }

    pub fn with_header(mut self, header: ArchiveHeader) -> Self {
        self.header = header;
        self
    }

    /// Replace the image decoder.
    pub fn with_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Convert textures on the rayon thread pool. Entries are still written in
    /// selection order.
    pub fn with_parallel_conversion(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Register a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(PackProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Pack every texture found under `texture_dir` into `output_path`.
    ///
    /// Nothing is left at `output_path` when packing fails.
    pub fn pack_directory(
        &self,
        texture_dir: impl AsRef<Utf8Path>,
        output_path: impl AsRef<Utf8Path>,
    ) -> Result<PackSummary> {
        let texture_dir = texture_dir.as_ref();
        let output_path = output_path.as_ref();

        tracing::info!("Packing textures from {}", texture_dir);
        tracing::info!("Output: {}", output_path);

        let candidates = collect_candidates(texture_dir)?;

        let output_dir = match output_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        std::fs::create_dir_all(output_dir)?;

        let temp = tempfile::Builder::new()
            .prefix(".gxa-")
            .suffix(".tmp")
            .tempfile_in(output_dir)?;
        let summary = self.pack_files(&candidates, BufWriter::new(temp.as_file()))?;

        temp.persist(output_path).map_err(|e| Error::Io(e.error))?;
        Ok(summary)
    }

    /// Select, convert and write the given candidate files to `writer`.
    pub fn pack_files<W: Write + Seek>(
        &self,
        candidates: &[Utf8PathBuf],
        writer: W,
    ) -> Result<PackSummary> {
        let start_time = Instant::now();

        self.emit_progress(PackProgress {
            stage: PackStage::Selecting,
            current_file: None,
            current: 0,
            total: 0,
        });
        let selection = select_textures(candidates);
        tracing::info!(
            "Selected {} textures from {} candidates",
            selection.jobs.len(),
            candidates.len()
        );

        let mut archive = ArchiveWriter::new(writer, &self.header)?;
        self.write_selection(&selection, &mut archive)?;

        self.emit_progress(PackProgress {
            stage: PackStage::Finalizing,
            current_file: None,
            current: 0,
            total: 0,
        });
        let archive_summary = archive.finalize()?;

        let summary = PackSummary {
            entries_added: archive_summary.entry_count,
            orphaned_alpha: selection.orphaned_alpha,
            table_offset: archive_summary.table_offset,
            archive_size: archive_summary.archive_size,
            build_time: start_time.elapsed(),
        };
        tracing::info!(
            "Entries added: {} ({} bytes)",
            summary.entries_added,
            summary.archive_size
        );

        self.emit_progress(PackProgress {
            stage: PackStage::Complete,
            current_file: None,
            current: summary.entries_added,
            total: summary.entries_added,
        });
        Ok(summary)
    }

    fn write_selection<W: Write + Seek>(
        &self,
        selection: &Selection,
        archive: &mut ArchiveWriter<W>,
    ) -> Result<()> {
        let total = selection.jobs.len() as u32;

        if self.parallel {
            let converted = AtomicU32::new(0);
            let records = selection
                .jobs
                .par_iter()
                .map(|job| {
                    let record = self.convert(job)?;
                    self.emit_progress(PackProgress {
                        stage: PackStage::Converting,
                        current_file: Some(record.file_name().to_string()),
                        current: converted.fetch_add(1, Ordering::Relaxed) + 1,
                        total,
                    });
                    Ok(record)
                })
                .collect::<Result<Vec<_>>>()?;

            for (i, mut record) in records.into_iter().enumerate() {
                self.append(archive, &mut record, i as u32 + 1, total)?;
            }
        } else {
            for (i, job) in selection.jobs.iter().enumerate() {
                let mut record = self.convert(job)?;
                self.emit_progress(PackProgress {
                    stage: PackStage::Converting,
                    current_file: Some(record.file_name().to_string()),
                    current: i as u32 + 1,
                    total,
                });
                self.append(archive, &mut record, i as u32 + 1, total)?;
            }
        }
        Ok(())
    }

    fn convert(&self, job: &TextureJob) -> Result<TextureRecord> {
        TextureRecord::from_job(job, self.loader.as_ref()).map_err(|e| {
            tracing::error!("Failed to process {}: {}", job.file_name(), e);
            e
        })
    }

    fn append<W: Write + Seek>(
        &self,
        archive: &mut ArchiveWriter<W>,
        record: &mut TextureRecord,
        current: u32,
        total: u32,
    ) -> Result<()> {
        archive.append(record)?;
        tracing::info!("{}", record);
        self.emit_progress(PackProgress {
            stage: PackStage::Writing,
            current_file: Some(record.file_name().to_string()),
            current,
            total,
        });
        Ok(())
    }

    fn emit_progress(&self, progress: PackProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }
}
