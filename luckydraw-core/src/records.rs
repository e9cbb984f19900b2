//! Roster input: turns a delimited participant file into validated
//! [`Participant`]s.
//!
//! The file needs a header row with a `Name` column; an `Identifier` column
//! is optional. Any row without a usable name rejects the whole file so a
//! bad roster never replaces a good one.

use crate::error::{LuckyDrawError, Result};
use crate::types::{Participant, ParticipantName};
use async_trait::async_trait;
use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::StreamExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

pub const NAME_COLUMN: &str = "Name";
pub const IDENTIFIER_COLUMN: &str = "Identifier";

/// Anything that can hand the registry a validated roster
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn read(&self) -> Result<Vec<Participant>>;

    fn describe(&self) -> String;
}

/// Roster backed by a CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    async fn read(&self) -> Result<Vec<Participant>> {
        let file = tokio::fs::File::open(&self.path).await?;
        let participants = parse_records(file).await?;

        tracing::info!(
            "Read {} participants from {}",
            participants.len(),
            self.path.display()
        );
        Ok(participants)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

struct Columns {
    name: usize,
    identifier: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(wanted)
            })
        };

        let name = find(NAME_COLUMN)
            .ok_or_else(|| LuckyDrawError::MissingColumn(NAME_COLUMN.to_string()))?;

        Ok(Self {
            name,
            identifier: find(IDENTIFIER_COLUMN),
        })
    }
}

/// Parse a roster from any async reader.
pub async fn parse_records<R>(reader: R) -> Result<Vec<Participant>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut csv_reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .create_reader(reader);

    let columns = Columns::locate(csv_reader.headers().await?)?;

    let mut participants = Vec::new();
    let mut seen = HashSet::new();
    let mut records = csv_reader.records();

    while let Some(record) = records.next().await {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        // rows made only of separators count as blank lines
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let raw_name = record.get(columns.name).unwrap_or_default();
        let participant = match columns.identifier {
            Some(idx) => {
                let name = ParticipantName::new(raw_name)
                    .ok_or_else(|| LuckyDrawError::invalid_record(line, "missing Name"))?;
                Participant::new(name, record.get(idx).map(str::to_string))
            }
            None => {
                let (name, identifier) = split_combined(raw_name);
                let name = ParticipantName::new(name)
                    .ok_or_else(|| LuckyDrawError::invalid_record(line, "missing Name"))?;
                Participant::new(name, identifier)
            }
        };

        if !seen.insert(participant.identity().to_string()) {
            tracing::warn!(
                "Duplicate participant '{}' on line {}; both rows share one winner slot",
                participant.identity(),
                line
            );
        }

        participants.push(participant);
    }

    Ok(participants)
}

/// Single-column rosters carry the identifier as `Name (Identifier)`.
fn split_combined(raw: &str) -> (&str, Option<String>) {
    let trimmed = raw.trim();
    if let Some(open) = trimmed.rfind('(') {
        if trimmed.ends_with(')') {
            let head = trimmed[..open].trim();
            let inner = trimmed[open + 1..trimmed.len() - 1].trim();
            if !head.is_empty() {
                return (head, Some(inner.to_string()));
            }
        }
    }
    (trimmed, None)
}
