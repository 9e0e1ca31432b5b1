// Turns exported daily histories into a BarSeries
use anyhow::anyhow;
use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::WINDOWS_1252;
use shared::models::{BarSeries, MarketBar};
use shared::utils::brazilian_format;
use std::borrow::Cow;
use std::path::Path;

use crate::config::policy::MIN_SESSIONS;
use crate::config::settings::{EngineSettings, InputLayout};
use crate::error::{EngineError, Result};

const DATE_COLUMN: &str = "Data";
const OPEN_COLUMN: &str = "Abertura";
const HIGH_COLUMN: &str = "Máximo";
const LOW_COLUMN: &str = "Mínimo";
const CLOSE_COLUMN: &str = "Fechamento";

/// Decodes one line or field as UTF-8, falling back to Windows-1252 (a superset of Latin-1).
///
/// Broker exports come in either encoding, sometimes mixed within one file, so the choice is
/// made per line rather than per file.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    }
}

/// Reads the two supported export layouts.
///
/// Both are lenient per row: a line that does not parse or decode, or that carries a price
/// that is not strictly positive, is skipped and logged. Only an empty source or a result
/// with fewer than two sessions is an error.
pub struct BarParser;

impl BarParser {
    /// Dispatches on the configured input layout.
    pub fn load_file(path: impl AsRef<Path>, settings: &EngineSettings) -> Result<BarSeries> {
        match settings.input.layout {
            InputLayout::Table => Self::load_table(path),
            InputLayout::Delimited => Self::load_delimited(path, settings.delimiter_byte()?),
        }
    }

    pub fn load_table(path: impl AsRef<Path>) -> Result<BarSeries> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "Read whitespace table");
        Self::parse_table_bytes(&raw)
    }

    /// Like [`BarParser::parse_table`], decoding each line with [`decode_line`] first.
    pub fn parse_table_bytes(raw: &[u8]) -> Result<BarSeries> {
        let content = raw
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse_table(&content)
    }

    /// Header line, then `date open high low close [...]` separated by whitespace.
    pub fn parse_table(content: &str) -> Result<BarSeries> {
        if content.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        // first non-empty line is the header
        for (idx, line) in content.lines().filter(|line| !line.trim().is_empty()).enumerate().skip(1) {
            match Self::parse_table_row(line) {
                Ok(bar) if bar.has_positive_prices() => bars.push(bar),
                Ok(bar) => {
                    skipped += 1;
                    tracing::debug!(row = idx + 1, date = %bar.date, "Skipping row with non-positive price");
                }
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(row = idx + 1, error = %e, "Skipping unparseable row");
                }
            }
        }
        Self::finish(bars, skipped)
    }

    fn parse_table_row(line: &str) -> anyhow::Result<MarketBar> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 5 {
            return Err(anyhow!("expected 5 columns, found {}", columns.len()));
        }
        Ok(MarketBar::new(
            brazilian_format::parse_date(columns[0])?,
            brazilian_format::parse_decimal(columns[1])?,
            brazilian_format::parse_decimal(columns[2])?,
            brazilian_format::parse_decimal(columns[3])?,
            brazilian_format::parse_decimal(columns[4])?,
        ))
    }

    pub fn load_delimited(path: impl AsRef<Path>, delimiter: u8) -> Result<BarSeries> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = raw.len(), "Read delimited export");
        Self::parse_delimited(&raw, delimiter)
    }

    // Header: Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade
    // Row:    WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938;123.983;600.822.115,84;24.228
    pub fn parse_delimited(content: &[u8], delimiter: u8) -> Result<BarSeries> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(EngineError::EmptyInput);
        }

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content);
        // header names are matched after decoding, so Latin-1 "Máximo" still resolves
        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|field| decode_line(field).trim().to_string())
            .collect();
        for required in [DATE_COLUMN, OPEN_COLUMN, HIGH_COLUMN, LOW_COLUMN, CLOSE_COLUMN] {
            if Self::column_index(&headers, required).is_none() {
                return Err(EngineError::InputFormatError(format!(
                    "missing '{}' column in header",
                    required
                )));
            }
        }

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for (idx, result) in rdr.byte_records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(line = idx + 2, error = %e, "Skipping unreadable record");
                    continue;
                }
            };
            match Self::parse_record(&record, &headers) {
                Ok(bar) if bar.has_positive_prices() => bars.push(bar),
                Ok(bar) => {
                    skipped += 1;
                    tracing::debug!(line = idx + 2, date = %bar.date, "Skipping row with non-positive price");
                }
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(line = idx + 2, error = %e, "Skipping unparseable row");
                }
            }
        }
        Self::finish(bars, skipped)
    }

    fn parse_record(record: &ByteRecord, headers: &[String]) -> anyhow::Result<MarketBar> {
        Ok(MarketBar::new(
            brazilian_format::parse_date(Self::get_field(record, headers, DATE_COLUMN)?)?,
            brazilian_format::parse_decimal(Self::get_field(record, headers, OPEN_COLUMN)?)?,
            brazilian_format::parse_decimal(Self::get_field(record, headers, HIGH_COLUMN)?)?,
            brazilian_format::parse_decimal(Self::get_field(record, headers, LOW_COLUMN)?)?,
            brazilian_format::parse_decimal(Self::get_field(record, headers, CLOSE_COLUMN)?)?,
        ))
    }

    fn column_index(headers: &[String], name: &str) -> Option<usize> {
        headers.iter().position(|header| header == name)
    }

    // Looks a field up by header name so column order does not matter
    fn get_field<'a>(record: &'a ByteRecord, headers: &[String], name: &str) -> anyhow::Result<&'a str> {
        let raw = Self::column_index(headers, name)
            .and_then(|pos| record.get(pos))
            .ok_or_else(|| anyhow!("missing '{}' field", name))?;
        std::str::from_utf8(raw).map_err(|e| anyhow!("'{}' field is not valid text: {}", name, e))
    }

    fn finish(bars: Vec<MarketBar>, skipped: usize) -> Result<BarSeries> {
        let parsed = bars.len();
        let series = BarSeries::from_unordered(bars);
        if skipped > 0 {
            tracing::warn!(skipped, "Some input rows were discarded");
        }
        if series.len() < MIN_SESSIONS {
            return Err(EngineError::InsufficientData { found: series.len() });
        }
        tracing::info!(
            sessions = series.len(),
            duplicates = parsed - series.len(),
            "Loaded daily history"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    fn create_test_file_bytes(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_table_valid() {
        let content = "\
Data       Abertura   Máxima     Mínima     Fechamento  Volume
07/03/2024 127.100    128.020    126.500    127.450     1.000
08/03/2024 127.450    128.340,5  126.900    128.010
";
        let series = BarParser::parse_table(content).unwrap();
        assert_eq!(series.len(), 2);
        let latest = series.latest().unwrap();
        assert_eq!(latest.date, date(2024, 3, 8));
        assert_eq!(latest.high, 128340.5);
        assert_eq!(latest.close, 128010.0);
        assert_eq!(series.previous().unwrap().open, 127100.0);
    }

    #[test]
    fn test_parse_table_skips_bad_rows() {
        let content = "\

header line
06/03/2024 10,00 11,00 9,00 10,50
not a row at all
31/02/2024 10,00 11,00 9,00 10,50
07/03/2024 10,50 12,00 0 11,00
08/03/2024 11,00 12,00 10,00 11,50
09/03/2024 11,00 12,00
";
        let series = BarParser::parse_table(content).unwrap();
        let dates: Vec<NaiveDate> = series.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 6)]);
    }

    #[test]
    fn test_parse_table_duplicate_dates_keep_first() {
        let content = "\
Data Abertura Maxima Minima Fechamento
08/03/2024 11,00 12,00 10,00 11,50
07/03/2024 10,00 11,00 9,00 10,50
08/03/2024 99,00 99,00 99,00 99,00
";
        let series = BarParser::parse_table(content).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().close, 11.5);
    }

    #[test]
    fn test_parse_table_insufficient_rows() {
        let content = "Data Abertura Maxima Minima Fechamento\n08/03/2024 11,00 12,00 10,00 11,50\n";
        assert!(matches!(
            BarParser::parse_table(content),
            Err(EngineError::InsufficientData { found: 1 })
        ));
        // header only
        assert!(matches!(
            BarParser::parse_table("Data Abertura Maxima Minima Fechamento"),
            Err(EngineError::InsufficientData { found: 0 })
        ));
    }

    #[test]
    fn test_parse_table_empty_input() {
        assert!(matches!(BarParser::parse_table(""), Err(EngineError::EmptyInput)));
        assert!(matches!(BarParser::parse_table(" \n\n \t"), Err(EngineError::EmptyInput)));
    }

    #[test]
    fn test_load_table_from_file() {
        let file = create_test_file(
            "Data Abertura Maxima Minima Fechamento\n07/03/2024 1,0 2,0 0,5 1,5\n08/03/2024 1,5 2,5 1,0 2,0",
        );
        let series = BarParser::load_table(file.path()).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_load_delimited_valid_data() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento;Volume;Quantidade
WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938;123.983;600.822.115,84;24.228
WINFUT;27/12/2024;18:20:00;123.500;124.200;123.100;124.000;500.000.000,00;20.000";
        let file = create_test_file(csv_content);
        let series = BarParser::load_delimited(file.path(), b';').unwrap();

        assert_eq!(series.len(), 2);
        let latest = series.latest().unwrap();
        assert_eq!(latest.date, date(2024, 12, 30));
        // index quotes: '.' groups thousands
        assert_eq!(latest.open, 124080.0);
        assert_eq!(latest.high, 124090.0);
        assert_eq!(latest.low, 123938.0);
        assert_eq!(latest.close, 123983.0);
    }

    #[test]
    fn test_load_delimited_column_order_and_delimiter() {
        let csv_content = "\
Fechamento,Data,Mínimo,Máximo,Abertura
\"23,75\",03/01/2023,\"23,40\",\"23,80\",\"23,50\"
\"24,10\",04/01/2023,\"23,60\",\"24,20\",\"23,75\"";
        let file = create_test_file(csv_content);
        let series = BarParser::load_delimited(file.path(), b',').unwrap();
        let latest = series.latest().unwrap();
        assert_eq!(latest.date, date(2023, 1, 4));
        assert_eq!(latest.open, 23.75);
        assert_eq!(latest.close, 24.10);
    }

    #[test]
    fn test_load_delimited_missing_column() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo
WINFUT;30/12/2024;18:20:00;124.080;124.090;123.938";
        let file = create_test_file(csv_content);
        let result = BarParser::load_delimited(file.path(), b';');
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("missing 'Fechamento' column"));
    }

    #[test]
    fn test_load_delimited_skips_invalid_values() {
        let csv_content = "\
Ativo;Data;Hora;Abertura;Máximo;Mínimo;Fechamento
WINFUT;30/12/2024;18:20:00;NOT_A_NUMBER;124.090;123.938;123.983
WINFUT;27/12/2024;18:20:00;123.500;124.200;123.100;124.000
WINFUT;26/12/2024;18:20:00;123.000;124.000;-1;123.500
WINFUT;23/12/2024
WINFUT;20/12/2024;18:20:00;122.000;123.000;121.500;122.800";
        let file = create_test_file(csv_content);
        let series = BarParser::load_delimited(file.path(), b';').unwrap();
        let dates: Vec<NaiveDate> = series.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 12, 27), date(2024, 12, 20)]);
    }

    #[test]
    fn test_load_delimited_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(matches!(
            BarParser::load_delimited(file.path(), b';'),
            Err(EngineError::EmptyInput)
        ));
    }

    #[test]
    fn test_load_file_follows_settings() {
        let csv_content = "\
Data|Abertura|Máximo|Mínimo|Fechamento
07/03/2024|10,00|11,00|9,00|10,50
08/03/2024|10,50|12,00|10,00|11,50";
        let file = create_test_file(csv_content);
        let settings = EngineSettings::from_json_str(
            r#"{ "input": { "layout": "delimited", "delimiter": "|" } }"#,
        )
        .unwrap();
        let series = BarParser::load_file(file.path(), &settings).unwrap();
        assert_eq!(series.latest().unwrap().close, 11.5);
    }

    #[test]
    fn test_load_file_missing() {
        let result = BarParser::load_file("definitely_missing_history.txt", &EngineSettings::default());
        assert!(matches!(result, Err(EngineError::IoError { .. })));
    }

    #[test]
    fn test_decode_line_falls_back_to_windows_1252() {
        assert_eq!(decode_line("Máximo".as_bytes()), "Máximo");
        assert_eq!(decode_line(b"M\xe1ximo"), "Máximo");
        assert_eq!(decode_line(b"M\xednima"), "Mínima");
    }

    #[test]
    fn test_load_table_latin1_header() {
        let content = b"Data Abertura M\xe1xima M\xednima Fechamento\n\
07/03/2024 10,00 11,00 9,00 10,50\n\
08/03/2024 10,50 12,00 10,00 11,50\n";
        let file = create_test_file_bytes(content);
        let series = BarParser::load_table(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().close, 11.5);
    }

    #[test]
    fn test_load_table_skips_undecodable_row() {
        let content = b"Data Abertura Maxima Minima Fechamento\n\
07/03/2024 10,00 11,00 9,00 10,50\n\
09/03/2024 \xff 12,00 10,00 11,50\n\
08/03/2024 10,50 12,00 10,00 11,50\n";
        let file = create_test_file_bytes(content);
        let series = BarParser::load_table(file.path()).unwrap();
        let dates: Vec<NaiveDate> = series.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 7)]);
    }

    #[test]
    fn test_load_delimited_latin1_header() {
        let content = b"Ativo;Data;Abertura;M\xe1ximo;M\xednimo;Fechamento\n\
WINFUT;07/03/2024;10,00;11,00;9,00;10,50\n\
WINFUT;08/03/2024;10,50;12,00;10,00;11,50\n";
        let file = create_test_file_bytes(content);
        let series = BarParser::load_delimited(file.path(), b';').unwrap();
        assert_eq!(series.len(), 2);
        let latest = series.latest().unwrap();
        assert_eq!(latest.high, 12.0);
        assert_eq!(latest.low, 10.0);
    }

    #[test]
    fn test_load_delimited_skips_undecodable_row() {
        let mut content = "Data;Abertura;Máximo;Mínimo;Fechamento\n".as_bytes().to_vec();
        content.extend_from_slice(b"07/03/2024;10,00;11,00;9,00;10,50\n");
        content.extend_from_slice(b"09/03/2024;\xff;12,00;10,00;11,50\n");
        content.extend_from_slice(b"08/03/2024;10,50;12,00;10,00;11,50\n");
        let file = create_test_file_bytes(&content);
        let series = BarParser::load_delimited(file.path(), b';').unwrap();
        let dates: Vec<NaiveDate> = series.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 7)]);
    }
}
