//! Plain-text export of raffle and match results

use round_clock::format_time;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{RecordsError, Result};
use crate::matches::MatchRecord;
use crate::raffle::RaffleEntry;

pub const RAFFLE_EXPORT_STEM: &str = "vote_results";
pub const MATCH_EXPORT_STEM: &str = "match_results";

const MATCH_CSV_HEADER: &str = "id,round,elapsed,red,blue,winner,note";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }

    /// `stem.csv` or `stem.txt`
    pub fn file_name(self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(RecordsError::UnknownFormat(other.to_string())),
        }
    }
}

/// `name : number` lines ascending by number
pub fn raffle_lines(entries: &[RaffleEntry]) -> String {
    let mut sorted: Vec<&RaffleEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.number);
    sorted
        .iter()
        .map(|entry| format!("{} : {}", entry.name, entry.number))
        .collect::<Vec<_>>()
        .join("\n")
}

fn elapsed_display(seconds: u32) -> String {
    format_time(u64::from(seconds) * 1000)
}

/// Quote a field when it holds a comma, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn match_csv(records: &[MatchRecord]) -> String {
    let mut out = String::from(MATCH_CSV_HEADER);
    for record in records {
        let row = [
            record.id.to_string(),
            csv_field(&record.round_label),
            elapsed_display(record.elapsed_seconds),
            record.red.to_string(),
            record.blue.to_string(),
            record.winner.to_string(),
            csv_field(&record.note),
        ];
        out.push('\n');
        out.push_str(&row.join(","));
    }
    out
}

pub fn match_txt(records: &[MatchRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let mut line = format!(
                "#{} [{}] {} red {} : {} blue ({})",
                record.id,
                record.round_label,
                elapsed_display(record.elapsed_seconds),
                record.red,
                record.blue,
                record.winner,
            );
            if !record.note.is_empty() {
                line.push_str(" - ");
                line.push_str(&record.note);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `content` to `dir/filename`, creating `dir` if needed
pub fn write_export(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    if content.is_empty() {
        return Err(RecordsError::NothingToExport);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, content)?;
    tracing::info!("Exported {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::MatchLedger;
    use score_ledger::Points;
    use tempfile::TempDir;

    fn entry(name: &str, number: u32) -> RaffleEntry {
        RaffleEntry { name: name.to_string(), number }
    }

    #[test]
    fn test_raffle_lines_sorted_by_number() {
        let entries = vec![entry("Lee", 7), entry("Kim", 2), entry("Park", 11)];
        assert_eq!(raffle_lines(&entries), "Kim : 2\nLee : 7\nPark : 11");
        assert_eq!(raffle_lines(&[]), "");
    }

    #[test]
    fn test_match_csv() {
        let mut ledger = MatchLedger::new();
        ledger.record("QF, mat 2", 125, Points::from_tenths(35), Points::new(1));
        ledger.record("SF", 60, Points::new(2), Points::new(2));

        let csv = ledger.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,round,elapsed,red,blue,winner,note");
        assert_eq!(lines[1], "1,\"QF, mat 2\",02:05.00,3.5,1,red,");
        assert_eq!(lines[2], "2,SF,01:00.00,2,2,draw,");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_match_txt() {
        let mut ledger = MatchLedger::new();
        ledger.record("F", 180, Points::new(1), Points::new(4));
        let edit = crate::matches::MatchEdit::from_assignments(["note=injury time"]).unwrap();
        ledger.edit(1, edit).unwrap();

        assert_eq!(ledger.to_txt(), "#1 [F] 03:00.00 red 1 : 4 blue (blue) - injury time");
    }

    #[test]
    fn test_export_format() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "txt".parse::<ExportFormat>().unwrap().file_name(RAFFLE_EXPORT_STEM),
            "vote_results.txt"
        );
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(RecordsError::UnknownFormat(format)) if format == "pdf"
        ));
    }

    #[test]
    fn test_write_export() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("exports");

        let path = write_export(&dir, "vote_results.csv", "Kim : 2").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Kim : 2");

        assert!(matches!(write_export(&dir, "empty.txt", ""), Err(RecordsError::NothingToExport)));
    }
}
