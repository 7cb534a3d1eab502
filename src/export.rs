// CSV and JSON export of maintenance records

use crate::error::{Error, Result};
use crate::record::MaintenanceRecord;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Column order of the CSV export
pub const CSV_HEADER: [&str; 7] = ["id", "date", "car", "mileage", "type", "cost", "notes"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension used when no output file is given
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Write `records` to `path`, returning how many were written
///
/// With no records nothing is written and an existing file at `path` is left
/// alone. Otherwise the output is built in a temporary file next to `path`
/// and renamed into place.
pub fn export(records: &[MaintenanceRecord], path: &Path, format: ExportFormat) -> Result<usize> {
    if records.is_empty() {
        debug!(file = ?path, "No records, skipping export");
        return Ok(0);
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut buf = Vec::new();
    match format {
        ExportFormat::Csv => write_csv(records, &mut buf)?,
        ExportFormat::Json => write_json(records, &mut buf)?,
    }

    let tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
    write_output(tmp.as_file(), &buf, path)?;
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    info!(file = ?path, count = records.len(), ?format, "Exported records");
    Ok(records.len())
}

/// Write the serialized export, reporting failures against `path`
fn write_output<W: Write>(mut writer: W, bytes: &[u8], path: &Path) -> Result<()> {
    writer.write_all(bytes).map_err(|e| Error::io(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Header row plus one row per record, in the given order
///
/// Missing mileage and notes become empty fields; cost has two decimals.
pub fn write_csv<W: Write>(records: &[MaintenanceRecord], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;

    for r in records {
        out.write_record([
            r.id.to_string(),
            r.date.to_string(),
            r.car.clone(),
            r.mileage.map(|m| m.to_string()).unwrap_or_default(),
            r.service_type.clone(),
            format!("{:.2}", r.cost),
            r.notes.clone().unwrap_or_default(),
        ])?;
    }

    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Pretty-printed JSON array of records
pub fn write_json<W: Write>(records: &[MaintenanceRecord], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewRecord;
    use chrono::Utc;
    use std::fs;
    use tempfile::TempDir;

    fn record(id: u64, car: &str, mileage: Option<u64>, notes: Option<&str>) -> MaintenanceRecord {
        NewRecord {
            car: car.to_string(),
            date: Some(format!("2024-0{}-01", id)),
            mileage,
            service_type: "oil change".to_string(),
            cost: Some(45.5),
            notes: notes.map(str::to_string),
        }
        .into_record(id, Utc::now())
        .unwrap()
    }

    #[test]
    fn test_write_csv_rows_in_input_order() {
        let records = vec![
            record(3, "Golf", None, None),
            record(1, "Civic", Some(55_000), Some("synthetic, 5W-30")),
        ];

        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "id,date,car,mileage,type,cost,notes",
                "3,2024-03-01,Golf,,oil change,45.50,",
                "1,2024-01-01,Civic,55000,oil change,45.50,\"synthetic, 5W-30\"",
            ]
        );
    }

    #[test]
    fn test_export_empty_creates_no_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");

        let count = export(&[], &path, ExportFormat::Csv).unwrap();
        assert_eq!(count, 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_empty_leaves_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");
        fs::write(&path, "previous export\n").unwrap();

        export(&[], &path, ExportFormat::Csv).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous export\n");
    }

    #[test]
    fn test_export_csv_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");
        let records = vec![record(1, "Civic", Some(1), None), record(2, "Golf", Some(2), None)];

        let count = export(&records, &path, ExportFormat::Csv).unwrap();
        assert_eq!(count, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next(), Some("id,date,car,mileage,type,cost,notes"));
    }

    #[test]
    fn test_export_json_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");
        let records = vec![record(1, "Civic", Some(1), Some("ok"))];

        export(&records, &path, ExportFormat::Json).unwrap();

        let parsed: Vec<MaintenanceRecord> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_export_to_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no/such/dir/out.csv");
        let records = vec![record(1, "Civic", None, None)];

        let err = export(&records, &path, ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("out.csv"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_io_error_with_path() {
        let path = Path::new("out.csv");
        let err = write_output(FailingWriter, b"id,date\n", path).unwrap_err();

        match err {
            Error::Io { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_export_onto_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taken");
        fs::create_dir(&path).unwrap();

        let err = export(&[record(1, "Civic", None, None)], &path, ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(path.is_dir());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
    }
}
