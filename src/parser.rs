// 🏗️ Source Loaders - CSV / XLSX / JSON → raw rows
// The only place that touches files; the engine itself is pure

use crate::entities::HostRegistry;
use crate::error::{EngineError, Result};
use crate::record::{HistoricalRow, RecentSource, Sheet, SheetRow};
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceType - shape of the recent medal source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// One table with the historical column set
    FlatCsv,
    /// One sheet per edition, named "<Year>_<Season>"
    Workbook,
}

impl SourceType {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceType::FlatCsv => "Flat CSV",
            SourceType::Workbook => "XLSX workbook",
        }
    }
}

/// RecentParser - loads the recent source in whichever shape it comes
pub trait RecentParser: Send + Sync {
    fn parse(&self, file_path: &Path) -> Result<RecentSource>;

    fn source_type(&self) -> SourceType;
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Detect the recent source shape from the file extension
pub fn detect_source(file_path: &Path) -> Result<SourceType> {
    let extension = file_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => Ok(SourceType::FlatCsv),
        "xlsx" | "xlsm" => Ok(SourceType::Workbook),
        _ => Err(EngineError::UnsupportedSource(file_path.display().to_string())),
    }
}

pub fn get_parser(source_type: SourceType) -> Box<dyn RecentParser> {
    match source_type {
        SourceType::FlatCsv => Box::new(FlatCsvParser::new()),
        SourceType::Workbook => Box::new(WorkbookParser::new()),
    }
}

/// Detect + parse in one step
pub fn load_recent(file_path: &Path) -> Result<RecentSource> {
    let parser = get_parser(detect_source(file_path)?);
    let source = parser.parse(file_path)?;
    tracing::info!(
        path = %file_path.display(),
        source = parser.source_type().name(),
        rows = source.row_count(),
        "loaded recent source"
    );
    Ok(source)
}

// ============================================================================
// HISTORICAL CSV
// ============================================================================

/// Historical table: country, gold, silver, bronze, year, games_type,
/// host_city, host_country (+ ignored extras such as `athletes`)
pub struct HistoricalCsvParser;

impl HistoricalCsvParser {
    pub fn new() -> Self {
        HistoricalCsvParser
    }

    pub fn parse(&self, file_path: &Path) -> Result<Vec<HistoricalRow>> {
        let file = File::open(file_path)?;
        let rows = self.parse_reader(file)?;
        tracing::info!(path = %file_path.display(), rows = rows.len(), "loaded historical source");
        Ok(rows)
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<HistoricalRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: HistoricalRow = result?;
            rows.push(row);
        }
        Ok(rows)
    }
}

impl Default for HistoricalCsvParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RECENT: FLAT CSV
// ============================================================================

pub struct FlatCsvParser;

impl FlatCsvParser {
    pub fn new() -> Self {
        FlatCsvParser
    }
}

impl Default for FlatCsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentParser for FlatCsvParser {
    fn parse(&self, file_path: &Path) -> Result<RecentSource> {
        let file = File::open(file_path)?;
        let rows = HistoricalCsvParser::new().parse_reader(file)?;
        Ok(RecentSource::Flat(rows))
    }

    fn source_type(&self) -> SourceType {
        SourceType::FlatCsv
    }
}

// ============================================================================
// RECENT: XLSX WORKBOOK (one sheet per edition)
// ============================================================================

pub struct WorkbookParser;

impl WorkbookParser {
    pub fn new() -> Self {
        WorkbookParser
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentParser for WorkbookParser {
    fn parse(&self, file_path: &Path) -> Result<RecentSource> {
        let mut workbook: Xlsx<_> = open_workbook(file_path)?;
        let sheet_names = workbook.sheet_names().to_vec();

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for sheet_name in &sheet_names {
            let range = workbook.worksheet_range(sheet_name)?;
            let rows: Vec<&[Data]> = range.rows().collect();
            sheets.push(sheet_from_rows(sheet_name, &rows)?);
        }

        Ok(RecentSource::Sheets(sheets))
    }

    fn source_type(&self) -> SourceType {
        SourceType::Workbook
    }
}

const COUNTRY: &str = "country";
const MEDAL_COLUMNS: [&str; 3] = ["gold", "silver", "bronze"];

/// Build a sheet from its cell rows; the first row is the header
pub fn sheet_from_rows(sheet_name: &str, rows: &[&[Data]]) -> Result<Sheet> {
    let source_name = format!("sheet '{}'", sheet_name);

    let header: Vec<String> = rows
        .first()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => s.trim().to_lowercase(),
                    _ => String::new(),
                })
                .collect()
        })
        .unwrap_or_default();

    let column = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EngineError::MissingColumn {
                column: name.to_string(),
                source_name: source_name.clone(),
            })
    };

    let country_col = column(COUNTRY)?;
    let [gold_col, silver_col, bronze_col] = [
        column(MEDAL_COLUMNS[0])?,
        column(MEDAL_COLUMNS[1])?,
        column(MEDAL_COLUMNS[2])?,
    ];

    let mut sheet_rows = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let line = idx + 1;

        let country = match row.get(country_col) {
            Some(Data::String(s)) => Some(s.clone()),
            _ => None,
        };

        sheet_rows.push(SheetRow {
            country,
            gold: medal_count(row.get(gold_col), MEDAL_COLUMNS[0], &source_name, line)?,
            silver: medal_count(row.get(silver_col), MEDAL_COLUMNS[1], &source_name, line)?,
            bronze: medal_count(row.get(bronze_col), MEDAL_COLUMNS[2], &source_name, line)?,
        });
    }

    Ok(Sheet {
        key: sheet_name.to_string(),
        rows: sheet_rows,
    })
}

/// Blank cells count as zero; anything not a non-negative integer is fatal
fn medal_count(cell: Option<&Data>, column: &str, source_name: &str, row: usize) -> Result<u32> {
    let invalid = |value: String| EngineError::InvalidCell {
        column: column.to_string(),
        value,
        source_name: source_name.to_string(),
        row,
    };

    match cell {
        None | Some(Data::Empty) => Ok(0),
        Some(Data::Int(i)) => u32::try_from(*i).map_err(|_| invalid(i.to_string())),
        Some(Data::Float(f)) if *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64 => Ok(*f as u32),
        Some(Data::String(s)) => s.trim().parse().map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(format!("{:?}", other))),
    }
}

// ============================================================================
// HOST METADATA JSON
// ============================================================================

pub fn load_hosts(file_path: &Path) -> Result<HostRegistry> {
    let content = fs::read_to_string(file_path)?;
    let hosts = HostRegistry::from_json(&content)?;
    tracing::info!(path = %file_path.display(), editions = hosts.len(), "loaded host metadata");
    Ok(hosts)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Season;
    use std::io::Write;

    const HISTORICAL_CSV: &str = "\
country,gold,silver,bronze,year,games_type,host_city,host_country,athletes
United States of America,39,41,33,2020,Summer,Tokyo,Japan,\"Athlete A, Athlete B\"
Norway,16,8,13,2022,Winter,Beijing,China,
";

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(detect_source(Path::new("medals.xlsx")).unwrap(), SourceType::Workbook);
        assert_eq!(detect_source(Path::new("recent.CSV")).unwrap(), SourceType::FlatCsv);
        assert!(matches!(
            detect_source(Path::new("medals.pdf")),
            Err(EngineError::UnsupportedSource(_))
        ));
    }

    #[test]
    fn test_get_parser() {
        assert_eq!(get_parser(SourceType::Workbook).source_type(), SourceType::Workbook);
        assert_eq!(get_parser(SourceType::FlatCsv).source_type(), SourceType::FlatCsv);
    }

    #[test]
    fn test_historical_csv_ignores_extra_columns() {
        let rows = HistoricalCsvParser::new()
            .parse_reader(HISTORICAL_CSV.as_bytes())
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "United States of America");
        assert_eq!(rows[0].gold, 39);
        assert_eq!(rows[1].games_type, Season::Winter);
        assert_eq!(rows[1].host_city, "Beijing");
    }

    #[test]
    fn test_historical_csv_missing_column_is_error() {
        let csv = "country,gold,silver,year,games_type,host_city,host_country\nJapan,1,2,2020,Summer,Tokyo,Japan\n";
        let result = HistoricalCsvParser::new().parse_reader(csv.as_bytes());
        assert!(matches!(result, Err(EngineError::Csv(_))));
    }

    #[test]
    fn test_flat_csv_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(HISTORICAL_CSV.as_bytes()).unwrap();

        let source = load_recent(file.path()).unwrap();
        match source {
            RecentSource::Flat(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected flat source, got {:?}", other),
        }
    }

    #[test]
    fn test_sheet_from_rows() {
        let rows = vec![
            vec![s("Rank"), s("Country"), s("Gold"), s("Silver"), s("Bronze")],
            vec![Data::Int(1), s("United States"), Data::Float(40.0), Data::Int(44), Data::Int(42)],
            vec![Data::Int(2), s("China\u{a0}"), Data::Int(40), Data::Int(27), Data::Empty],
            vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty],
        ];
        let slices: Vec<&[Data]> = rows.iter().map(Vec::as_slice).collect();

        let sheet = sheet_from_rows("2024_Summer", &slices).unwrap();

        assert_eq!(sheet.key, "2024_Summer");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].country.as_deref(), Some("United States"));
        assert_eq!(sheet.rows[0].gold, 40);
        assert_eq!(sheet.rows[1].bronze, 0);
    }

    #[test]
    fn test_sheet_non_string_country_is_none() {
        let rows = vec![
            vec![s("country"), s("gold"), s("silver"), s("bronze")],
            vec![Data::Float(3.0), Data::Int(1), Data::Int(0), Data::Int(0)],
        ];
        let slices: Vec<&[Data]> = rows.iter().map(Vec::as_slice).collect();

        let sheet = sheet_from_rows("2024_Summer", &slices).unwrap();
        assert_eq!(sheet.rows[0].country, None);
    }

    #[test]
    fn test_sheet_missing_column() {
        let rows = vec![vec![s("country"), s("gold"), s("silver")]];
        let slices: Vec<&[Data]> = rows.iter().map(Vec::as_slice).collect();

        let result = sheet_from_rows("2024_Summer", &slices);
        assert!(matches!(
            result,
            Err(EngineError::MissingColumn { ref column, .. }) if column == "bronze"
        ));
    }

    #[test]
    fn test_sheet_invalid_count() {
        let rows = vec![
            vec![s("country"), s("gold"), s("silver"), s("bronze")],
            vec![s("Japan"), Data::Float(2.5), Data::Int(0), Data::Int(0)],
        ];
        let slices: Vec<&[Data]> = rows.iter().map(Vec::as_slice).collect();

        let result = sheet_from_rows("2024_Summer", &slices);
        assert!(matches!(result, Err(EngineError::InvalidCell { row: 2, .. })));
    }

    #[test]
    fn test_load_hosts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "Summer": {{ "2024": {{ "ville": "Paris", "pays": "France" }} }} }}"#).unwrap();

        let hosts = load_hosts(file.path()).unwrap();
        assert_eq!(hosts.lookup(Season::Summer, 2024).city, "Paris");
    }
}
