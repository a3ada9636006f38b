// ============================================================
// CSV PARSER
// ============================================================
// Reads uploaded CSV sheets into header-keyed rows

use crate::domain::error::{AppError, Result};
use crate::domain::import::RawRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use std::path::Path;

/// CSV parser with delimiter detection and a Windows-1252 fallback for
/// sheets exported by older spreadsheet tools.
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse CSV content. The first record is the header row. Rows whose
    /// cells are all blank come back as empty maps so row positions survive;
    /// lines with no characters at all are skipped by the reader.
    pub fn parse_content(&self, content: &str) -> Result<Vec<RawRow>> {
        let content = content.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(Self::parse_row(&headers, &record));
        }

        Ok(rows)
    }

    /// Parse a CSV file, detecting its delimiter from the first lines.
    pub fn parse_file_auto_detect(path: &Path) -> Result<Vec<RawRow>> {
        let content = read_with_encoding_fallback(path)?;
        let delimiter = Self::detect_delimiter(&content);
        Self::new().with_delimiter(delimiter).parse_content(&content)
    }

    fn parse_row(headers: &StringRecord, record: &StringRecord) -> RawRow {
        headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .filter_map(|(idx, header)| {
                let value = record.get(idx).unwrap_or("");
                (!value.is_empty()).then(|| (header.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();
        if sample_lines.is_empty() {
            return b',';
        }

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());
            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

fn read_with_encoding_fallback(path: &Path) -> Result<String> {
    let buffer = std::fs::read(path)
        .map_err(|e| AppError::IoError(format!("Failed to read file: {}", e)))?;

    match String::from_utf8(buffer) {
        Ok(content) => Ok(content),
        Err(err) => {
            let (content, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(content.into_owned())
        }
    }
}
