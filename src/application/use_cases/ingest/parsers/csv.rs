// ============================================================
// CSV PARSER
// ============================================================
// Delimited-text parsing with encoding and delimiter detection

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataTable;

/// Parse delimited text content into a table.
///
/// The first record is the header row. Rows of uneven width are accepted;
/// the table builder pads or truncates them against the header.
pub fn parse(bytes: &[u8]) -> Result<DataTable> {
    let content = decode_text(bytes)?;
    let delimiter = detect_delimiter(&content);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::ParseError(format!("failed to read CSV headers: {}", e)))?
        .clone();
    let headers: Vec<String> = headers.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::ParseError("CSV content has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::ParseError(format!("failed to parse CSV row {}: {}", index + 1, e))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(DataTable::from_rows(headers, rows))
}

/// Decode upload bytes as text, trying UTF-8 first and falling back to
/// Windows-1252. Content that looks binary is rejected outright rather
/// than being mangled into a one-column table.
fn decode_text(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(AppError::ParseError("file is empty".to_string()));
    }
    if bytes.contains(&0) {
        return Err(AppError::ParseError("content is not text".to_string()));
    }

    let content = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                return Err(AppError::ParseError(
                    "content is neither UTF-8 nor Windows-1252 text".to_string(),
                ));
            }
            decoded.into_owned()
        }
    };

    let control_chars = content
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n'))
        .count();
    if control_chars * 10 > content.chars().count() {
        return Err(AppError::ParseError("content is not text".to_string()));
    }

    Ok(content)
}

/// Detect the delimiter (comma, semicolon, tab, pipe) by scoring each
/// candidate on per-line frequency and consistency over a sample.
pub fn detect_delimiter(content: &str) -> u8 {
    let candidates = [b',', b';', b'\t', b'|'];
    let sample_lines: Vec<_> = content.lines().take(10).collect();

    let mut best_delimiter = b',';
    let mut best_score = 0.0f32;

    for &delimiter in &candidates {
        if sample_lines.is_empty() {
            continue;
        }

        let field_counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();

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
