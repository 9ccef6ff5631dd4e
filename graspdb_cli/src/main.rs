//! # graspdb
//!
//! Command-line driver for importing GRASP workbooks into a JSON store and exporting them back.
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use graspdb_core::import::{import_grasp_model, ImportOptionsBuilder};
use graspdb_core::io::grasp::export_grasp_model;
use graspdb_core::io::reaction_parse::{format_reaction, parse_reaction};
use graspdb_core::io::workbook::CsvWorkbook;
use graspdb_core::store::MemoryStore;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(name = "graspdb")]
#[command(version = "0.1.0")]
#[command(about = "Curate GRASP kinetic models", long_about = None)]
struct Cli {
    /// Log every created row
    #[arg(short, long)]
    verbose: bool,

    /// JSON store file, created if absent
    #[arg(long, default_value = "graspdb.json")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a workbook directory (one csv file per sheet)
    Import {
        /// Workbook directory
        dir: PathBuf,
        /// Organism the model describes
        #[arg(long)]
        organism: String,
        /// Strain of the organism
        #[arg(long)]
        strain: Option<String>,
    },

    /// Export a stored model as a workbook directory
    Export {
        /// Model name
        model: String,
        /// Output directory
        out_dir: PathBuf,
    },

    /// Parse a reaction string and print its stoichiometry
    Parse {
        /// Reaction, e.g. "atp_c + glc_c <-> adp_c + g6p_c"
        reaction: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    match cli.command {
        Commands::Import {
            dir,
            organism,
            strain,
        } => {
            let mut store = open_store(&cli.db)?;
            let options = ImportOptionsBuilder::default()
                .organism(organism)
                .strain(strain)
                .build()?;
            let report = import_grasp_model(&mut store, &CsvWorkbook::new(&dir), &options)
                .with_context(|| format!("Unable to import {}", dir.display()))?;
            store.save_json(&cli.db)?;
            for diagnostic in &report.diagnostics {
                warn!("{:?}", diagnostic);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Export { model, out_dir } => {
            let store = open_store(&cli.db)?;
            let mut workbook = CsvWorkbook::new(&out_dir);
            export_grasp_model(&store, &model, &mut workbook)
                .with_context(|| format!("Unable to export {}", model))?;
            println!("Wrote {} to {}", model, workbook.root().display());
        }

        Commands::Parse { reaction } => {
            let parsed = parse_reaction(&reaction)?;
            for (metabolite, coefficient) in &parsed.stoichiometry {
                println!("{}\t{}", metabolite, coefficient);
            }
            println!("reversible\t{}", parsed.reversible);
            if let Some(lower_bound) = parsed.lower_bound {
                println!("lower bound\t{}", lower_bound);
            }
            if let Some(upper_bound) = parsed.upper_bound {
                println!("upper bound\t{}", upper_bound);
            }
            if let Some(objective) = parsed.objective_coefficient {
                println!("objective\t{}", objective);
            }
            println!(
                "{}",
                format_reaction(&parsed.stoichiometry, parsed.reversible)
            );
        }
    }

    Ok(())
}

fn open_store(path: &Path) -> anyhow::Result<MemoryStore> {
    if path.is_file() {
        MemoryStore::load_json(path)
            .with_context(|| format!("Unable to load store {}", path.display()))
    } else {
        info!("Starting a new store at {}", path.display());
        Ok(MemoryStore::new())
    }
}
