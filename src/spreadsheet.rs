//! Spreadsheet readers.
//!
//! Turns one CSV or XLSX file into [`RawRow`]s. Headers are trimmed and
//! lower-cased, then looked up by the configured column names (matched the
//! same way). The week, day, and topic columns are expected; lesson columns
//! are optional and read as blanks when absent. Fully blank lines are
//! dropped.
//!
//! XLSX files are read directly from the OOXML package (zip + quick-xml):
//! only the first worksheet is used, and cell references keep values in
//! their columns when empty cells are omitted from the XML. Cell styles are
//! not read, so date-formatted cells come through as their serial number
//! (e.g. `"45915"`); store dates as text in the sheet to keep them readable.
//! A cell reference past column `XFD` makes the whole file an error.

use std::io::Read;
use std::path::Path;

use crate::config::ColumnsConfig;
use crate::models::RawRow;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("unsupported file extension: '{0}'")]
    UnsupportedExtension(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX extraction failed: {0}")]
    Xlsx(String),
    #[error("file has no header row or no data rows")]
    Empty,
}

impl From<zip::result::ZipError> for SheetError {
    fn from(err: zip::result::ZipError) -> Self {
        SheetError::Xlsx(err.to_string())
    }
}

impl From<quick_xml::Error> for SheetError {
    fn from(err: quick_xml::Error) -> Self {
        SheetError::Xlsx(err.to_string())
    }
}

/// Header row plus data rows, all cells as trimmed strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// Rows mapped onto the schedule columns.
#[derive(Debug, Clone, Default)]
pub struct SheetRows {
    pub rows: Vec<RawRow>,
    /// Required columns (week, day, topic) not present in the header.
    pub missing_columns: Vec<String>,
}

/// Reads `path` and maps it onto the configured columns.
pub fn read_rows(path: &Path, columns: &ColumnsConfig) -> Result<SheetRows, SheetError> {
    let table = read_table(path)?;
    Ok(map_columns(&table, columns))
}

/// Reads the header and records of a CSV or XLSX file.
pub fn read_table(path: &Path) -> Result<Table, SheetError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    let reader: fn(&[u8]) -> Result<Table, SheetError> = match extension.as_str() {
        "csv" | "tsv" | "txt" => read_delimited,
        "xlsx" | "xlsm" => read_xlsx,
        other => return Err(SheetError::UnsupportedExtension(other.to_string())),
    };

    let bytes = std::fs::read(path)?;
    let table = reader(&bytes)?;

    if table.headers.is_empty() || table.records.is_empty() {
        return Err(SheetError::Empty);
    }
    Ok(table)
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Maps table columns onto [`RawRow`] fields by header name.
pub fn map_columns(table: &Table, columns: &ColumnsConfig) -> SheetRows {
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_header(h)).collect();
    let find = |name: &str| {
        let wanted = normalize_header(name);
        headers.iter().position(|h| *h == wanted)
    };

    let week = find(&columns.week);
    let day = find(&columns.day);
    let topic = find(&columns.topic);
    let lesson = find(&columns.lesson);
    let lesson_link = find(&columns.lesson_link);
    let free_link = find(&columns.free_link);

    let missing_columns = [(&columns.week, week), (&columns.day, day), (&columns.topic, topic)]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.clone())
        .collect();

    let cell = |record: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i)).cloned().unwrap_or_default()
    };

    let rows = table
        .records
        .iter()
        .map(|record| RawRow {
            week: cell(record, week),
            day: cell(record, day),
            topic: cell(record, topic),
            lesson: cell(record, lesson),
            lesson_link: cell(record, lesson_link),
            free_link: cell(record, free_link),
        })
        .collect();

    SheetRows {
        rows,
        missing_columns,
    }
}

// ============ CSV ============

/// UTF-8 with a Latin-1 fallback for exports from older spreadsheet tools.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Picks the most frequent of `;`, tab, and `,` on the first non-blank line.
/// Ties and lines with none of them fall back to `,`.
fn detect_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };
    let counts = [
        (b';', line.matches(';').count()),
        (b'\t', line.matches('\t').count()),
        (b',', line.matches(',').count()),
    ];
    match counts.iter().max_by_key(|(_, count)| *count) {
        Some((delimiter, count)) if *count > 0 => *delimiter,
        _ => b',',
    }
}

fn read_delimited(bytes: &[u8]) -> Result<Table, SheetError> {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(&text))
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|value| value.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let values: Vec<String> = record.iter().map(|value| value.trim().to_string()).collect();
        if values.iter().all(|value| value.is_empty()) {
            continue;
        }
        records.push(values);
    }

    Ok(Table { headers, records })
}

// ============ XLSX ============

type Archive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

fn read_zip_entry_bounded(archive: &mut Archive<'_>, name: &str) -> Result<Vec<u8>, SheetError> {
    let entry = archive.by_name(name)?;
    let mut out = Vec::new();
    entry.take(MAX_XML_ENTRY_BYTES).read_to_end(&mut out)?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(SheetError::Xlsx(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, MAX_XML_ENTRY_BYTES
        )));
    }
    Ok(out)
}

fn read_xlsx(bytes: &[u8]) -> Result<Table, SheetError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;

    let shared_strings = if archive.file_names().any(|n| n == SHARED_STRINGS) {
        let xml = read_zip_entry_bounded(&mut archive, SHARED_STRINGS)?;
        parse_shared_strings(&xml)?
    } else {
        Vec::new()
    };

    let sheet = first_worksheet_name(&archive)
        .ok_or_else(|| SheetError::Xlsx("workbook contains no worksheets".to_string()))?;
    let xml = read_zip_entry_bounded(&mut archive, &sheet)?;
    let mut rows = parse_sheet_rows(&xml, &shared_strings)?
        .into_iter()
        .filter(|row| row.iter().any(|value| !value.is_empty()));

    let headers = rows.next().unwrap_or_default();
    Ok(Table {
        headers,
        records: rows.collect(),
    })
}

/// Lowest-numbered `xl/worksheets/sheetN.xml`.
fn first_worksheet_name(archive: &Archive<'_>) -> Option<String> {
    archive
        .file_names()
        .filter(|n| n.starts_with(WORKSHEET_PREFIX) && n.ends_with(".xml"))
        .min_by_key(|name| {
            name.trim_start_matches(WORKSHEET_PREFIX)
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        })
        .map(|s| s.to_string())
}

/// Each `<si>` yields one string: the concatenation of its `<t>` runs.
/// Phonetic runs (`<rPh>`) are not part of the visible text.
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, SheetError> {
    use quick_xml::events::Event;

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_t = current.is_some() && !in_phonetic,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(te) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&te.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    if let Some(s) = current.take() {
                        strings.push(s);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Highest zero-based column index a worksheet may use (`XFD`).
const MAX_COLUMN: usize = 16_383;

/// `"BC12"` → `Ok(Some(54))` (zero-based column of a cell reference).
/// References without letters give `Ok(None)`; columns past `XFD` are an
/// error.
fn column_index(reference: &str) -> Result<Option<usize>, SheetError> {
    let out_of_range = || SheetError::Xlsx(format!("cell reference out of range: '{}'", reference));

    let mut index = 0usize;
    let mut letters = 0usize;
    for b in reference.bytes().take_while(|b| b.is_ascii_alphabetic()) {
        let digit = (b.to_ascii_uppercase() - b'A' + 1) as usize;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .filter(|i| *i <= MAX_COLUMN + 1)
            .ok_or_else(out_of_range)?;
        letters += 1;
    }
    if letters == 0 {
        return Ok(None);
    }
    Ok(Some(index - 1))
}

#[derive(Debug, Default)]
struct CellState {
    column: usize,
    kind: String,
    text: String,
}

impl CellState {
    fn resolve(self, shared_strings: &[String]) -> String {
        let raw = self.text.trim();
        let value = match self.kind.as_str() {
            "s" => raw
                .parse::<usize>()
                .ok()
                .and_then(|i| shared_strings.get(i))
                .cloned()
                .unwrap_or_default(),
            "b" => match raw {
                "1" => "TRUE".to_string(),
                "0" => "FALSE".to_string(),
                other => other.to_string(),
            },
            _ => raw.to_string(),
        };
        value.trim().to_string()
    }
}

fn place(row: &mut Vec<String>, column: usize, value: String) {
    if row.len() <= column {
        row.resize(column + 1, String::new());
    }
    row[column] = value;
}

fn cell_from_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    next_column: usize,
) -> Result<CellState, SheetError> {
    let mut cell = CellState {
        column: next_column,
        ..CellState::default()
    };
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(col) = column_index(&String::from_utf8_lossy(&attr.value))? {
                    cell.column = col;
                }
            }
            b"t" => cell.kind = String::from_utf8_lossy(&attr.value).into_owned(),
            _ => {}
        }
    }
    if cell.column > MAX_COLUMN {
        return Err(SheetError::Xlsx(format!(
            "row has more than {} columns",
            MAX_COLUMN + 1
        )));
    }
    Ok(cell)
}

/// Reads every `<row>` of a worksheet into positional cell values.
fn parse_sheet_rows(xml: &[u8], shared_strings: &[String]) -> Result<Vec<Vec<String>>, SheetError> {
    use quick_xml::events::Event;

    let mut rows = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<CellState> = None;
    let mut capture = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row = Some(Vec::new()),
                b"c" => {
                    let next = row.as_ref().map_or(0, |r| r.len());
                    cell = Some(cell_from_attributes(&e, next)?);
                }
                b"v" | b"t" => capture = cell.is_some(),
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"c" {
                    if let Some(r) = row.as_mut() {
                        let empty = cell_from_attributes(&e, r.len())?;
                        place(r, empty.column, String::new());
                    }
                }
            }
            Event::Text(te) if capture => {
                if let Some(c) = cell.as_mut() {
                    c.text.push_str(&te.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    if let (Some(c), Some(r)) = (cell.take(), row.as_mut()) {
                        let column = c.column;
                        place(r, column, c.resolve(shared_strings));
                    }
                }
                b"row" => {
                    if let Some(r) = row.take() {
                        rows.push(r);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}
