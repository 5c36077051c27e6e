// CLASSIFICATION: COMMUNITY
// Filename: pk_extract.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Extract binary blobs from the hex dumps in a log file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;
use pk::extract::{DumpExtractor, ExtractedDump, Filter};
use serde::Serialize;

#[derive(Parser)]
#[command(about = "Extract BLOBs from the dump records in a log")]
struct Cli {
    /// The log file
    file: PathBuf,
    /// Echo every log line as it is read
    #[arg(short, long)]
    verbose: bool,
    /// Tag the records were written with
    #[arg(short = 'T', long, default_value = pk::config::DEFAULT_TAG)]
    pk_tag: String,
    /// Only extract from this source file
    #[arg(long)]
    c_file: Option<String>,
    /// Only extract from this source line
    #[arg(long)]
    c_line: Option<u32>,
    /// Only extract from this function
    #[arg(long)]
    c_func: Option<String>,
    /// Only extract blobs of at least this many bytes
    #[arg(long)]
    min_size: Option<usize>,
    /// Only extract blobs of at most this many bytes
    #[arg(long)]
    max_size: Option<usize>,
    /// Directory for the extracted files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Append one JSON line per extracted blob to this file
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    #[serde(flatten)]
    dump: &'a ExtractedDump,
    path: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let filter = Filter {
        file: cli.c_file.clone(),
        line: cli.c_line,
        func: cli.c_func.clone(),
        min_size: cli.min_size,
        max_size: cli.max_size,
    };
    let mut extractor = DumpExtractor::new(cli.pk_tag.clone());
    let mut manifest = match &cli.manifest {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };
    fs::create_dir_all(&cli.out_dir)?;

    let reader = BufReader::new(File::open(&cli.file)?);
    for (idx, raw) in reader.split(b'\n').enumerate() {
        let lineno = idx + 1;
        let raw = raw?;
        let text = String::from_utf8_lossy(&raw);
        let text = text.trim_end_matches(['\r', '\n']);
        if cli.verbose {
            println!("{lineno:08}: {text}");
        }

        let Some(dump) = extractor.feed(lineno, text) else {
            continue;
        };

        if let Some(reason) = filter.skip_reason(&dump) {
            println!(
                "Skipping   {:8} bytes from lines {:8} to {:8} ({reason}...)",
                dump.data.len(),
                dump.start,
                dump.end
            );
            continue;
        }

        let path = cli.out_dir.join(dump.file_name());
        println!(
            "Extracting {:8} bytes from lines {:8} to {:8} into \"{}\"",
            dump.data.len(),
            dump.start,
            dump.end,
            path.display()
        );
        fs::write(&path, &dump.data)?;

        if let Some(f) = manifest.as_mut() {
            let entry = ManifestEntry {
                dump: &dump,
                path: path.display().to_string(),
            };
            writeln!(f, "{}", serde_json::to_string(&entry)?)?;
        }
    }

    info!(
        "done: {} dump(s) incomplete, {} lost sync",
        extractor.pending(),
        extractor.sync_losses()
    );
    Ok(())
}
