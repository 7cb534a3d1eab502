// JSONL data file: one metadata line followed by one record per line

use crate::error::{Error, Result};
use crate::record::MaintenanceRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const FORMAT_VERSION: u32 = 1;

/// First line of the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub version: u32,
    /// Next id to hand out; survives deletes so ids are never reused
    pub next_id: u64,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_id: 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    Record(MaintenanceRecord),
    Meta(StoreMeta),
}

/// Contents of a data file as loaded from disk
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub meta: StoreMeta,
    /// Records in file order
    pub records: Vec<MaintenanceRecord>,
}

/// Read a data file, skipping anything that cannot be parsed
///
/// A missing file is an empty snapshot. Unreadable or malformed lines are
/// logged and skipped. If the same id shows up more than once, the version
/// with the latest `updated_at` wins and keeps the position of the first
/// occurrence.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(file = ?path, "Data file does not exist yet");
            return Ok(Snapshot::default());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let reader = BufReader::new(file);
    let mut meta: Option<StoreMeta> = None;
    let mut records: Vec<MaintenanceRecord> = Vec::new();
    let mut positions: HashMap<u64, usize> = HashMap::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let parsed: Line = match serde_json::from_str(&line) {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        match parsed {
            Line::Meta(m) => {
                if m.version > FORMAT_VERSION {
                    warn!(file = ?path, version = m.version, "Data file written by a newer version");
                }
                meta = Some(m);
            }
            Line::Record(record) => match positions.get(&record.id).copied() {
                Some(pos) => {
                    if record.updated_at > records[pos].updated_at {
                        records[pos] = record;
                    }
                }
                None => {
                    positions.insert(record.id, records.len());
                    records.push(record);
                }
            },
        }
    }

    info!(
        file = ?path,
        count = records.len(),
        "Loaded records from JSONL"
    );

    Ok(Snapshot {
        meta: meta.unwrap_or_default(),
        records,
    })
}

/// Replace the data file with `meta` and `records`
///
/// The content goes to a temporary file in the same directory which is
/// synced and then renamed over `path`, so readers see either the old file
/// or the new one.
pub fn write_snapshot(path: &Path, meta: &StoreMeta, records: &[MaintenanceRecord]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        writeln!(writer, "{}", serde_json::to_string(meta)?).map_err(|e| Error::io(tmp.path(), e))?;
        for record in records {
            writeln!(writer, "{}", serde_json::to_string(record)?).map_err(|e| Error::io(tmp.path(), e))?;
        }
        writer.flush().map_err(|e| Error::io(tmp.path(), e))?;
    }
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    debug!(file = ?path, count = records.len(), "Wrote data file");
    Ok(())
}
