// Subcommand dispatch: store operations in, human-readable text out

use crate::error::Error;
use crate::export::{self, ExportFormat};
use crate::filter::SearchCriteria;
use crate::present::{OutputStyle, Presenter};
use crate::record::{MaintenanceRecord, NewRecord, RecordPatch};
use crate::store::Store;
use eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// One invocation of the tool
#[derive(Debug, Clone)]
pub enum Command {
    Add(NewRecord),
    List { car: Option<String> },
    Show { id: u64 },
    Search(SearchCriteria),
    Edit { id: u64, patch: RecordPatch },
    Delete { id: u64 },
    Export {
        file: Option<PathBuf>,
        format: ExportFormat,
        car: Option<String>,
    },
}

/// Settings shared by all commands
#[derive(Debug, Clone)]
pub struct Context {
    pub store_path: PathBuf,
    pub export_file: PathBuf,
    pub presenter: Presenter,
}

/// Run a command, writing its report to `out`
///
/// Failures of the operation itself (bad input, unknown id, unreadable or
/// unwritable files) are reported as text on `out` and are not errors here.
/// Only a failure to write to `out` is returned.
pub fn run<W: Write>(command: Command, ctx: &Context, out: &mut W) -> Result<()> {
    match execute(command, ctx, out) {
        Ok(()) => Ok(()),
        Err(report) => match report.downcast::<Error>() {
            Ok(err) => {
                debug!(error = ?err, "Command failed");
                writeln!(out, "{}", style_error(&err))?;
                Ok(())
            }
            Err(report) => Err(report),
        },
    }
}

fn execute<W: Write>(command: Command, ctx: &Context, out: &mut W) -> Result<()> {
    let mut store = Store::open(&ctx.store_path)?;

    match command {
        Command::Add(new) => {
            let record = store.add(new)?;
            writeln!(out, "{}", OutputStyle::success("Maintenance record added successfully."))?;
            writeln!(out, "Record ID: {}", record.id)?;
            writeln!(out, "{}", ctx.presenter.format(&record))?;
        }
        Command::List { car } => {
            let records = store.list(car.as_deref());
            if records.is_empty() {
                writeln!(out, "{}", OutputStyle::muted("No maintenance records found."))?;
            } else {
                let header = format!("Showing {} maintenance records:", records.len());
                writeln!(out, "{}", OutputStyle::header(&header))?;
                print_records(&records, &ctx.presenter, out)?;
            }
        }
        Command::Show { id } => {
            let record = store.get(id).ok_or(Error::NotFound(id))?;
            writeln!(out, "{}", ctx.presenter.format(&record))?;
        }
        Command::Search(criteria) => {
            let filters = criteria.filters()?;
            let records = store.search(&filters);
            if records.is_empty() {
                writeln!(out, "{}", OutputStyle::muted("No records matched your search."))?;
            } else {
                let header = format!("Found {} matching record(s):", records.len());
                writeln!(out, "{}", OutputStyle::header(&header))?;
                print_records(&records, &ctx.presenter, out)?;
            }
        }
        Command::Edit { id, patch } => {
            store.update(id, &patch)?;
            writeln!(out, "{}", OutputStyle::success(&format!("Updated record ID {}", id)))?;
        }
        Command::Delete { id } => {
            store.delete(id)?;
            let msg = format!("Record ID {} deleted successfully.", id);
            writeln!(out, "{}", OutputStyle::success(&msg))?;
        }
        Command::Export { file, format, car } => {
            let records = store.list(car.as_deref());
            let path = file.unwrap_or_else(|| ctx.export_file.with_extension(format.extension()));
            let count = export::export(&records, &path, format)?;
            if count == 0 {
                writeln!(out, "{}", OutputStyle::muted("No records to export."))?;
            } else {
                let msg = format!("Exported {} record(s) to {}", count, path.display());
                writeln!(out, "{}", OutputStyle::success(&msg))?;
            }
        }
    }

    Ok(())
}

fn print_records<W: Write>(records: &[MaintenanceRecord], presenter: &Presenter, out: &mut W) -> Result<()> {
    for record in records {
        writeln!(out, "{}", presenter.format(record))?;
        writeln!(out)?;
    }
    Ok(())
}

fn style_error(err: &Error) -> colored::ColoredString {
    let msg = err.to_string();
    match err {
        Error::NotFound(_) | Error::NoChanges => OutputStyle::warning(&msg),
        _ => OutputStyle::error(&msg),
    }
}
