//! sieve CLI: load a large CSV in full, as a prefix, or as a reproducible sample.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use sieve_core::config::LoaderConfig;
use sieve_io::{CsvReader, CsvWriter, JsonlWriter};
use sieve_loader::{BoundedLoader, LoadRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Memory-bounded CSV loading with reproducible streaming sampling", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV and print its size and columns
    Load {
        /// Path to the CSV file
        path: PathBuf,

        /// Keep-probability per row if the file does not fit in memory
        #[arg(long)]
        sample_frac: Option<f64>,

        /// Read only the first N rows
        #[arg(long)]
        nrows: Option<u64>,

        /// Rows per streamed chunk when sampling
        #[arg(long)]
        chunk_size: Option<usize>,

        /// YAML file with loader settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Memory cap in bytes (overrides config)
        #[arg(long)]
        memory_cap: Option<usize>,

        /// Treat more than N rows as exhaustion (overrides config)
        #[arg(long)]
        row_ceiling: Option<u64>,

        /// Sampling seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the loaded table here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for --output
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Print the load report as JSON
        #[arg(long)]
        report: bool,
    },

    /// Print the header columns of a CSV
    Schema {
        /// Path to the CSV file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Jsonl,
}

/// Loader settings file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    mem_cap_bytes: Option<usize>,
    chunk_size: Option<usize>,
    seed: Option<u64>,
    row_ceiling: Option<u64>,
    inflation_factor: Option<f64>,
    read_buffer_bytes: Option<usize>,
}

struct LoadArgs {
    path: PathBuf,
    sample_frac: Option<f64>,
    nrows: Option<u64>,
    chunk_size: Option<usize>,
    config: Option<PathBuf>,
    memory_cap: Option<usize>,
    row_ceiling: Option<u64>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    format: OutputFormat,
    report: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Load {
            path,
            sample_frac,
            nrows,
            chunk_size,
            config,
            memory_cap,
            row_ceiling,
            seed,
            output,
            format,
            report,
        } => run_load(LoadArgs {
            path,
            sample_frac,
            nrows,
            chunk_size,
            config,
            memory_cap,
            row_ceiling,
            seed,
            output,
            format,
            report,
        }),
        Commands::Schema { path } => show_schema(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_load(args: LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = LoaderConfig::from_env();
    if let Some(path) = &args.config {
        let doc = read_config_file(path)?;
        apply_file_config(&mut cfg, &doc);
    }
    if let Some(cap) = args.memory_cap {
        cfg.mem_cap_bytes = cap;
    }
    if let Some(ceiling) = args.row_ceiling {
        cfg.row_ceiling = Some(ceiling);
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }

    tracing::debug!(?cfg, "effective loader config");

    let loader = BoundedLoader::new(cfg)?;
    let req = LoadRequest {
        sample_frac: args.sample_frac,
        nrows: args.nrows,
        chunk_size: args
            .chunk_size
            .unwrap_or(loader.config().default_chunk_size),
    };

    let (table, report) = loader.load_with_report(&args.path, &req)?;

    println!("Loaded {} rows ({}).", table.num_rows(), report.strategy.name());
    println!("Columns: {:?}", table.schema().names());

    if let Some(out) = &args.output {
        match args.format {
            OutputFormat::Csv => {
                let mut w = CsvWriter::to_path(out)?;
                w.write_table(&table)?;
                w.flush()?;
            }
            OutputFormat::Jsonl => {
                let mut w = JsonlWriter::to_path(out)?;
                w.write_table(&table)?;
                w.flush()?;
            }
        }
        println!("Wrote {}", out.display());
    }

    if args.report {
        println!("{}", report.to_json()?);
    }

    Ok(())
}

fn show_schema(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = CsvReader::from_path(path, LoaderConfig::from_env().read_buffer_bytes)?;
    for (i, name) in reader.schema().names().iter().enumerate() {
        println!("{:>3}  {}", i, name);
    }
    Ok(())
}

fn read_config_file(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("read config {}: {}", path.display(), e))?;
    let doc: ConfigFile = serde_yaml::from_str(&text)
        .map_err(|e| format!("parse config {}: {}", path.display(), e))?;
    Ok(doc)
}

fn apply_file_config(cfg: &mut LoaderConfig, doc: &ConfigFile) {
    if let Some(cap) = doc.mem_cap_bytes {
        cfg.mem_cap_bytes = cap;
    }
    if let Some(chunk) = doc.chunk_size {
        cfg.default_chunk_size = chunk;
    }
    if let Some(seed) = doc.seed {
        cfg.seed = seed;
    }
    if let Some(ceiling) = doc.row_ceiling {
        cfg.row_ceiling = Some(ceiling);
    }
    if let Some(factor) = doc.inflation_factor {
        cfg.inflation_factor = factor;
    }
    if let Some(bytes) = doc.read_buffer_bytes {
        cfg.read_buffer_bytes = bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_file_config, ConfigFile, LoaderConfig};

    #[test]
    fn file_config_overrides_env_defaults() {
        let mut config = LoaderConfig::default();
        let doc: ConfigFile =
            serde_yaml::from_str("mem_cap_bytes: 1048576\nseed: 7\nchunk_size: 5000\n").unwrap();
        apply_file_config(&mut config, &doc);
        assert_eq!(config.mem_cap_bytes, 1_048_576);
        assert_eq!(config.seed, 7);
        assert_eq!(config.default_chunk_size, 5000);
        assert_eq!(config.row_ceiling, None);
    }

    #[test]
    fn cli_overrides_higher_priority_than_config() {
        let mut config = LoaderConfig::default();
        let doc = ConfigFile {
            seed: Some(3),
            ..Default::default()
        };
        apply_file_config(&mut config, &doc);
        assert_eq!(config.seed, 3);

        // Simulate CLI override after config
        config.seed = 11;
        assert_eq!(config.seed, 11);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<ConfigFile, _> = serde_yaml::from_str("spill_dir: /tmp\n");
        assert!(parsed.is_err());
    }
}
