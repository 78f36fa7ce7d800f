//! BoundedLoader: pick prefix, full, or sampled read for one call.
//!
//! Each call is independent. The budget is created per call and dropped with
//! it, the sampler is seeded from config every time, and no decision from an
//! earlier call is remembered.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use sieve_core::config::LoaderConfig;
use sieve_core::types::Table;
use sieve_io::CsvReader;
use sieve_mem::{MemoryBudgetImpl, PeakTracker};

use crate::error::{LoadError, Result, NEED_SAMPLE_FRAC};
use crate::probe::{CapacityProbe, ExhaustionCause, Materialization};
use crate::report::{LoadReport, Strategy};
use crate::request::LoadRequest;
use crate::sampler::BernoulliSampler;

pub struct BoundedLoader {
    cfg: LoaderConfig,
}

impl BoundedLoader {
    pub fn new(cfg: LoaderConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Loader configured from `SIEVE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(LoaderConfig::from_env())
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.cfg
    }

    /// A request carrying this loader's default chunk size.
    pub fn request(&self) -> LoadRequest {
        LoadRequest::default().with_chunk_size(self.cfg.default_chunk_size)
    }

    pub fn load(&self, path: impl AsRef<Path>, req: &LoadRequest) -> Result<Table> {
        self.load_with_report(path, req).map(|(table, _)| table)
    }

    pub fn load_with_report(
        &self,
        path: impl AsRef<Path>,
        req: &LoadRequest,
    ) -> Result<(Table, LoadReport)> {
        req.validate()?;
        let path = path.as_ref();
        let started = Instant::now();

        // Header first, whatever path runs.
        let mut reader = self.open(path)?;

        if let Some(nrows) = req.nrows {
            tracing::info!(source = %reader.source(), nrows, "reading prefix");
            let table = reader.read_prefix(nrows)?;
            let report = self.report(
                &reader,
                &table,
                Strategy::Prefix { nrows },
                Tally::default(),
                started,
            );
            return Ok(self.finish(table, report));
        }

        let budget = MemoryBudgetImpl::new(self.cfg.mem_cap_bytes);
        let probe = CapacityProbe::new(
            &budget,
            self.cfg.row_ceiling,
            self.cfg.inflation_factor,
        );
        let source_bytes = std::fs::metadata(path)
            .map_err(|source| LoadError::Io {
                path: reader.source().to_string(),
                source,
            })?
            .len();

        let verdict = match probe.precheck(source_bytes) {
            Some(cause) => Materialization::Exhausted(cause),
            None => probe.materialize(&mut reader)?,
        };

        match verdict {
            Materialization::Complete(table) => {
                tracing::info!(source = %reader.source(), rows = table.num_rows(), "full read");
                let report = self.report(&reader, &table, Strategy::Full, Tally::default(), started);
                Ok(self.finish(table, report))
            }
            Materialization::Exhausted(cause) => {
                drop(reader);
                let sample_frac = match req.sample_frac {
                    Some(frac) => frac,
                    None => {
                        tracing::error!(source = %path.display(), %cause, "full read exhausted and no sample_frac");
                        return Err(LoadError::Configuration(NEED_SAMPLE_FRAC.into()));
                    }
                };
                tracing::warn!(
                    source = %path.display(),
                    %cause,
                    sample_frac,
                    chunk_size = req.chunk_size,
                    "full read exhausted; falling back to streaming sample"
                );
                self.sample(path, sample_frac, req.chunk_size, cause, started)
            }
        }
    }

    fn open(&self, path: &Path) -> Result<CsvReader<File>> {
        Ok(CsvReader::from_path(path, self.cfg.read_buffer_bytes)?)
    }

    /// Stream `path` in `chunk_size` chunks and keep each row with
    /// probability `sample_frac`. At most one chunk plus the retained rows
    /// are resident at a time.
    fn sample(
        &self,
        path: &Path,
        sample_frac: f64,
        chunk_size: usize,
        cause: ExhaustionCause,
        started: Instant,
    ) -> Result<(Table, LoadReport)> {
        // Reopened so the stream starts at the first data row.
        let reader = self.open(path)?;
        let mut retained = Table::empty(reader.schema());
        let mut sampler = BernoulliSampler::new(sample_frac, self.cfg.seed);
        let tracker = PeakTracker::new();
        let mut retained_bytes = retained.estimated_bytes();

        let mut chunks = reader.into_chunks(chunk_size);
        while let Some(chunk) = chunks.next() {
            let chunk = chunk?;
            tracker.record_used(retained_bytes + chunk.estimated_bytes());
            let kept = sampler.sample(&chunk)?;
            tracing::debug!(
                chunk = chunks.chunks_read(),
                rows = chunk.num_rows(),
                kept = kept.num_rows(),
                "sampled chunk"
            );
            retained_bytes += kept.estimated_bytes();
            retained.append(kept)?;
        }

        if retained.is_empty() {
            tracing::info!(drawn = sampler.drawn(), "sample retained no rows");
        }

        let strategy = Strategy::Sample {
            sample_frac,
            chunk_size,
            seed: self.cfg.seed,
        };
        let tally = Tally {
            chunks_read: chunks.chunks_read(),
            peak_tracked_bytes: tracker.peak(),
            exhaustion: Some(cause),
        };
        let report = self.report(chunks.reader(), &retained, strategy, tally, started);
        Ok(self.finish(retained, report))
    }

    fn report<R: std::io::Read>(
        &self,
        reader: &CsvReader<R>,
        table: &Table,
        strategy: Strategy,
        tally: Tally,
        started: Instant,
    ) -> LoadReport {
        LoadReport {
            source: reader.source().to_string(),
            strategy,
            columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            rows_scanned: reader.rows_read(),
            rows_returned: table.num_rows() as u64,
            chunks_read: tally.chunks_read,
            bytes_scanned: reader.bytes_scanned(),
            peak_tracked_bytes: tally.peak_tracked_bytes,
            exhaustion: tally.exhaustion,
            fingerprint: table.fingerprint().to_hex(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            version: sieve_core::VERSION.to_string(),
        }
    }

    fn finish(&self, table: Table, report: LoadReport) -> (Table, LoadReport) {
        report.emit();
        (table, report)
    }
}

/// Sampling-path counters carried into the report.
#[derive(Default)]
struct Tally {
    chunks_read: u64,
    peak_tracked_bytes: usize,
    exhaustion: Option<ExhaustionCause>,
}

/// One-shot load with a loader configured from the environment.
pub fn load_csv_memory_friendly(
    path: impl AsRef<Path>,
    sample_frac: Option<f64>,
    nrows: Option<u64>,
    chunk_size: usize,
) -> Result<Table> {
    let req = LoadRequest {
        sample_frac,
        nrows,
        chunk_size,
    };
    BoundedLoader::from_env()?.load(path, &req)
}
