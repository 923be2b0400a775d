use crate::report::ReportRow;

const HEADER: [&str; 10] = [
    "folder",
    "file_name",
    "hash",
    "publisher",
    "hostname",
    "user",
    "matched_path_rule",
    "publisher_allowed",
    "hash_allowed",
    "would_be_blocked",
];

/// Render rows as delimited text with a header line.
///
/// Cells containing the delimiter, a quote or a line break are quoted per
/// RFC 4180. An absent path rule is an empty cell.
pub fn render(rows: &[&ReportRow], delimiter: char) -> String {
    let mut out = String::new();
    push_line(&mut out, HEADER.iter().copied(), delimiter);
    for row in rows {
        let publisher_allowed = row.publisher_allowed.to_string();
        let hash_allowed = row.hash_allowed.to_string();
        let would_be_blocked = row.would_be_blocked.to_string();
        let cells = [
            row.folder.as_str(),
            row.file_name.as_str(),
            row.hash.as_str(),
            row.publisher.as_str(),
            row.hostname.as_str(),
            row.user.as_str(),
            row.matched_path_rule.as_deref().unwrap_or(""),
            publisher_allowed.as_str(),
            hash_allowed.as_str(),
            would_be_blocked.as_str(),
        ];
        push_line(&mut out, cells.into_iter(), delimiter);
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, delimiter: char) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if cell.contains(&[delimiter, '"', '\n', '\r'][..]) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}
