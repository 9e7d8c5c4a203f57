use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ctos_engine::{display_fields, run_batch, Progress};
use ctos_model::{FieldKind, SchemaVariant, NEW_SHEETS, OLD_SHEETS};
use ctos_xlsx::{read_fragments_from_path, save_workbook, timestamped_workbook_path};

#[derive(Parser, Debug)]
#[command(about = "Extract CTOS report XML fragments into per-section workbooks")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the batch pipeline over a fragment table and write the
    /// per-section workbooks.
    Export {
        /// Input fragment table (CSV with NU_PTL and XML columns).
        input: PathBuf,

        /// Output directory for the generated workbooks.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Write only one workbook generation ("new" or "old"); default is
        /// both.
        #[arg(long)]
        schema: Option<SchemaVariant>,

        /// Print the run report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print the flattened field list for one account.
    Show {
        /// Input fragment table (CSV with NU_PTL and XML columns).
        input: PathBuf,

        /// Account identifier to display (collapses like grouping does).
        #[arg(long)]
        account: String,
    },
}

/// Coarse-grained stderr progress: one line every 50 accounts plus the
/// final count.
struct StderrProgress;

impl Progress for StderrProgress {
    fn begin(&mut self, total: usize) {
        eprintln!("processing {total} accounts");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn account_done(&mut self, current: usize, total: usize) {
        if current % 50 == 0 || current == total {
            eprintln!("  {current}/{total}");
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Export {
            input,
            out,
            schema,
            json,
        } => export(&input, &out, schema, json),
        Command::Show { input, account } => show(&input, &account),
    }
}

fn export(input: &Path, out: &Path, schema: Option<SchemaVariant>, json: bool) -> Result<()> {
    if schema == Some(SchemaVariant::Unknown) {
        bail!("--schema unknown is not a workbook generation; use \"new\" or \"old\"");
    }

    let fragments = read_fragments_from_path(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let output = run_batch(fragments, &mut StderrProgress);

    std::fs::create_dir_all(out)
        .with_context(|| format!("creating output directory {}", out.display()))?;

    if schema != Some(SchemaVariant::Old) {
        let path = timestamped_workbook_path(out, "ctos_new");
        save_workbook(&path, NEW_SHEETS, &output.new_sheets)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    if schema != Some(SchemaVariant::New) {
        let path = timestamped_workbook_path(out, "ctos_old");
        save_workbook(&path, OLD_SHEETS, &output.old_sheets)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
    } else {
        println!("accounts processed: {}", output.report.accounts_processed);
        if output.report.errors.is_empty() {
            println!("no extraction errors");
        } else {
            println!("extraction errors: {}", output.report.errors.len());
            for err in &output.report.errors {
                println!("  {}: {}", err.account, err.message);
            }
        }
    }
    Ok(())
}

fn show(input: &Path, account: &str) -> Result<()> {
    let fragments = read_fragments_from_path(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let fields = display_fields(fragments, account)
        .with_context(|| format!("no fragments for account {account:?}"))?;

    for field in fields {
        match field.kind {
            FieldKind::Section => println!("== {} ==", field.name),
            FieldKind::Spacer => println!(),
            _ => println!("{}: {}", field.name, field.value),
        }
    }
    Ok(())
}
