//! Delimited-text execution logs (CSV and TSV) with a header row.

use std::path::Path;

use super::{has_extension, LogFormat, LogSource};
use crate::error::{AuditError, Result};
use crate::record::ExecutionRecord;

/// Header spellings accepted for each record field, compared after
/// lowercasing and dropping spaces, underscores and dashes.
const FOLDER_HEADERS: &[&str] = &["folder", "folderpath", "directory", "path"];
const FILE_NAME_HEADERS: &[&str] = &["filename", "file", "name"];
const HASH_HEADERS: &[&str] = &["sha256", "hash", "filehash", "sha256hash"];
const PUBLISHER_HEADERS: &[&str] = &["publisher", "signer", "publishername"];
const HOSTNAME_HEADERS: &[&str] = &["hostname", "host", "computer", "computername"];
const USER_HEADERS: &[&str] = &["user", "username"];

pub struct DelimitedSource {
    delimiter: char,
    format: LogFormat,
    extensions: &'static [&'static str],
}

impl DelimitedSource {
    pub fn csv() -> Self {
        Self {
            delimiter: ',',
            format: LogFormat::Csv,
            extensions: &["csv"],
        }
    }

    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            format: LogFormat::Tsv,
            extensions: &["tsv", "tab"],
        }
    }

    /// Parse log text. `origin` names the input in error messages.
    pub fn parse(&self, text: &str, origin: &str) -> Result<Vec<ExecutionRecord>> {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let mut rows = split_rows(text, self.delimiter).map_err(|message| AuditError::Parse {
            file: origin.to_string(),
            message,
        })?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let header = rows.remove(0);
        let columns = ColumnMap::from_header(&header);
        if columns.is_empty() {
            return Err(AuditError::Parse {
                file: origin.to_string(),
                message: format!("no recognised columns in header: {}", header.join(", ")),
            });
        }

        Ok(rows.iter().map(|row| columns.record(row)).collect())
    }
}

impl LogSource for DelimitedSource {
    fn format(&self) -> LogFormat {
        self.format
    }

    fn detect(&self, path: &Path) -> bool {
        has_extension(path, self.extensions)
    }

    fn load(&self, path: &Path) -> Result<Vec<ExecutionRecord>> {
        let text = std::fs::read_to_string(path)?;
        self.parse(&text, &path.display().to_string())
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    folder: Option<usize>,
    file_name: Option<usize>,
    hash: Option<usize>,
    publisher: Option<usize>,
    hostname: Option<usize>,
    user: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let normalized: Vec<String> = header
            .iter()
            .map(|h| {
                h.chars()
                    .filter(|c| !matches!(c, ' ' | '_' | '-'))
                    .collect::<String>()
                    .to_lowercase()
            })
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };
        Self {
            folder: find(FOLDER_HEADERS),
            file_name: find(FILE_NAME_HEADERS),
            hash: find(HASH_HEADERS),
            publisher: find(PUBLISHER_HEADERS),
            hostname: find(HOSTNAME_HEADERS),
            user: find(USER_HEADERS),
        }
    }

    fn is_empty(&self) -> bool {
        self.folder.is_none()
            && self.file_name.is_none()
            && self.hash.is_none()
            && self.publisher.is_none()
            && self.hostname.is_none()
            && self.user.is_none()
    }

    fn record(&self, row: &[String]) -> ExecutionRecord {
        let field = |column: Option<usize>| {
            column
                .and_then(|i| row.get(i))
                .cloned()
                .unwrap_or_default()
        };
        ExecutionRecord {
            folder: field(self.folder),
            file_name: field(self.file_name),
            hash: field(self.hash),
            publisher: field(self.publisher),
            hostname: field(self.hostname),
            user: field(self.user),
        }
    }
}

/// Split delimited text into rows of fields, honouring double-quoted fields
/// (with `""` escapes and embedded line breaks). Blank lines are dropped.
fn split_rows(text: &str, delimiter: char) -> std::result::Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            c if c == delimiter => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                finish_row(&mut rows, &mut row, &mut field);
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(format!("unterminated quoted field at line {line}"));
    }
    finish_row(&mut rows, &mut row, &mut field);
    Ok(rows)
}

fn finish_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    row.push(std::mem::take(field));
    let row = std::mem::take(row);
    if !(row.len() == 1 && row[0].is_empty()) {
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_vendor_export_headers() {
        let text = "\u{FEFF}Folder,Filename,SHA256,Publisher,Hostname,Username\r\n\
                    C:\\Program Files\\,app.exe,AA,\"Contoso, Ltd\",WS-01,alice\r\n";
        let records = DelimitedSource::csv().parse(text, "log.csv").unwrap();
        assert_eq!(
            records,
            vec![ExecutionRecord {
                folder: "C:\\Program Files\\".into(),
                file_name: "app.exe".into(),
                hash: "AA".into(),
                publisher: "Contoso, Ltd".into(),
                hostname: "WS-01".into(),
                user: "alice".into(),
            }]
        );
    }

    #[test]
    fn header_order_and_spelling_are_flexible() {
        let text = "user,file_name,folder\nbob,x.exe,C:\\Temp\\\n";
        let records = DelimitedSource::csv().parse(text, "log.csv").unwrap();
        assert_eq!(records[0].user, "bob");
        assert_eq!(records[0].file_name, "x.exe");
        assert_eq!(records[0].folder, "C:\\Temp\\");
        assert_eq!(records[0].publisher, "");
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty() {
        let text = "Folder,Filename,SHA256\nC:\\Temp\\\n";
        let records = DelimitedSource::csv().parse(text, "log.csv").unwrap();
        assert_eq!(records[0].folder, "C:\\Temp\\");
        assert_eq!(records[0].file_name, "");
        assert_eq!(records[0].hash, "");
    }

    #[test]
    fn quoted_fields_keep_escaped_quotes_and_newlines() {
        let rows = split_rows("a,\"b \"\"q\"\"\nc\",d\n", ',').unwrap();
        assert_eq!(rows, vec![vec!["a", "b \"q\"\nc", "d"]]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = split_rows("a,b\n\n\nc,d", ',').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn tsv_uses_tabs() {
        let text = "Folder\tFilename\nC:\\A, B\\\tz.exe\n";
        let records = DelimitedSource::tsv().parse(text, "log.tsv").unwrap();
        assert_eq!(records[0].folder, "C:\\A, B\\");
        assert_eq!(records[0].file_name, "z.exe");
    }

    #[test]
    fn unterminated_quote_is_parse_error() {
        let err = DelimitedSource::csv()
            .parse("Folder\n\"C:\\Temp\n", "bad.csv")
            .unwrap_err();
        assert!(matches!(err, AuditError::Parse { .. }));
    }

    #[test]
    fn unknown_header_is_parse_error() {
        let err = DelimitedSource::csv()
            .parse("alpha,beta\n1,2\n", "bad.csv")
            .unwrap_err();
        assert!(matches!(err, AuditError::Parse { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(&path, "Folder,Filename\nC:\\Temp\\,a.exe\n").unwrap();
        let source = DelimitedSource::csv();
        assert!(source.detect(&path));
        assert_eq!(source.load(&path).unwrap().len(), 1);
    }
}
