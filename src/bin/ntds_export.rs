use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use ntds_export::{run, ExportConfig, ExportError, ExportFormat};
use tracing_subscriber::EnvFilter;

/// Export the datatable and link_table of an ntds snapshot
#[derive(Parser, Debug)]
#[command(name = "ntds_export", version, about)]
struct Args {
    /// Snapshot directory holding datatable.parquet and link_table.parquet
    #[arg(long, env = "NTDS_PATH")]
    ntds: PathBuf,

    /// Output shape
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    export_type: ExportFormat,

    /// Directory the artifacts are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ntds_export=debug")
        } else {
            EnvFilter::new("ntds_export=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Print a fatal error where it is seen even with logging filtered off
fn report_error(out: &mut impl Write, err: &ExportError) -> io::Result<()> {
    writeln!(out, "Error: {}", err)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = ExportConfig {
        source: args.ntds,
        format: args.export_type,
        output_dir: args.output_dir,
    };

    let start_time = Instant::now();
    match run(&config) {
        Ok(summary) => {
            let elapsed = start_time.elapsed().as_secs_f64();
            let stats = summary.stats;
            for table in &summary.tables {
                println!("{}: {} rows", table.table, table.rows);
            }
            for path in &summary.outputs {
                println!("Wrote {}", path.display());
            }
            println!("Time: {:.2}s", elapsed);
            println!(
                "Output size: {:.2} MB ({} bytes)",
                stats.bytes_written as f64 / 1_048_576.0,
                stats.bytes_written
            );
            println!("Fields/row: {:.1}", stats.fields_per_row());
            if elapsed > 0.0 {
                println!("Rows/second: {:.0}", stats.rows as f64 / elapsed);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("export failed: {e}");
            let _ = report_error(&mut io::stderr(), &e);
            ExitCode::FAILURE
        }
    }
}
