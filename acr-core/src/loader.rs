//! CSV loading for the historical record store.
//!
//! # CSV Format
//!
//! One header row, then one row per observed date:
//!
//! ```text
//! date,mean_wind_speed_kt,max_gust_kt,total_precipitation_mm,max_hourly_precipitation_mm,max_fresh_snow_depth_cm
//! 2015-01-28,7.4,18.1,,,
//! 2016-01-28,12.0,27.9,3.5,1.5,2.1
//! ```
//!
//! The timestamp column may be `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or
//! `YYYYMMDD`. Extra columns are ignored. Files ending in `.gz` are
//! decompressed.
//!
//! Columns are found by name, or by the header a [`CsvLayout`] maps the
//! name to (weather-service exports use Korean headers such as `일시` and
//! `평균풍속(KT)`). Text that is not UTF-8 is decoded as EUC-KR, using the
//! WHATWG decoder that also covers the CP949 extensions.

use crate::config::AcrConfig;
use crate::error::{AcrError, Result};
use crate::feature::FeatureSet;
use crate::history::{HistoricalEntry, HistoricalStore};
use acr_utils::dates::parse_timestamp;
use csv::{StringRecord, Trim};
use encoding_rs::EUC_KR;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What a blank feature cell means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankCell {
    /// Nothing was observed (no snow, no rain): load as 0.0.
    Zero,
    /// Every cell must carry a value; a blank is a load error.
    Reject,
}

/// How the columns of a CSV file map onto a feature set.
#[derive(Debug, Clone, Copy)]
pub struct CsvLayout<'a> {
    features: &'a FeatureSet,
    timestamp_column: &'a str,
    headers: Option<&'a BTreeMap<String, String>>,
    blank_cell: BlankCell,
}

impl<'a> CsvLayout<'a> {
    /// Columns named exactly after the features; blank cells read as 0.0.
    pub fn new(features: &'a FeatureSet, timestamp_column: &'a str) -> Self {
        CsvLayout {
            features,
            timestamp_column,
            headers: None,
            blank_cell: BlankCell::Zero,
        }
    }

    pub fn from_config(config: &'a AcrConfig) -> Self {
        Self::new(&config.features, &config.timestamp_column).with_headers(&config.columns)
    }

    /// Alternative header for a feature or the timestamp column, keyed by
    /// the feature (or timestamp column) name.
    pub fn with_headers(mut self, headers: &'a BTreeMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_blank_cell(mut self, blank_cell: BlankCell) -> Self {
        self.blank_cell = blank_cell;
        self
    }

    fn column_index(&self, headers: &StringRecord, name: &str, source: &str) -> Result<usize> {
        let alias = self
            .headers
            .and_then(|map| map.get(name))
            .map(String::as_str);
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == wanted)
        };
        position(name)
            .or_else(|| alias.and_then(position))
            .ok_or_else(|| match alias {
                Some(alias) => AcrError::configuration(format!(
                    "{source} has no '{name}' or '{alias}' column"
                )),
                None => AcrError::configuration(format!("{source} has no '{name}' column")),
            })
    }
}

impl HistoricalStore {
    /// Load a store from an in-memory CSV string.
    pub fn from_csv_str(csv_data: &str, layout: CsvLayout<'_>) -> Result<Self> {
        parse(csv_data, layout, "<string>")
    }

    /// Load a store from any CSV byte stream, UTF-8 or EUC-KR/CP949.
    pub fn from_csv_reader<R: Read>(reader: R, layout: CsvLayout<'_>) -> Result<Self> {
        load(reader, layout, "<reader>")
    }

    /// Load a store from a CSV file, gunzipping `.gz` files on the fly.
    pub fn from_path(path: impl AsRef<Path>, layout: CsvLayout<'_>) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let file = File::open(path).map_err(|e| load_error(&source, e))?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        load(reader, layout, &source)
    }
}

fn load<R: Read>(mut reader: R, layout: CsvLayout<'_>, source: &str) -> Result<HistoricalStore> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| load_error(source, e))?;
    let text = decode(bytes, source)?;
    parse(&text, layout, source)
}

fn decode(bytes: Vec<u8>, source: &str) -> Result<String> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Ok(text),
        Err(e) => e.into_bytes(),
    };
    let (text, had_errors) = EUC_KR.decode_without_bom_handling(&bytes);
    if had_errors {
        return Err(load_error(source, "text is neither UTF-8 nor EUC-KR/CP949"));
    }
    log::info!("loader: {} is not UTF-8, decoded as {}", source, EUC_KR.name());
    Ok(text.into_owned())
}

fn parse(text: &str, layout: CsvLayout<'_>, source: &str) -> Result<HistoricalStore> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let timestamp_index = layout.column_index(&headers, layout.timestamp_column, source)?;
    let feature_indices = layout
        .features
        .iter()
        .map(|feature| layout.column_index(&headers, feature, source))
        .collect::<Result<Vec<usize>>>()?;

    let mut entries = Vec::new();
    let mut skipped = 0u32;
    for result in rdr.records() {
        let r = result?;
        let timestamp = r.get(timestamp_index).unwrap_or("");
        let date = match parse_timestamp(timestamp) {
            Ok(date) => date,
            Err(e) => {
                log::debug!("loader: skipping row in {}: {}", source, e);
                skipped += 1;
                continue;
            }
        };

        let mut values = Vec::with_capacity(feature_indices.len());
        for (feature, &index) in layout.features.iter().zip(&feature_indices) {
            let cell = r.get(index).unwrap_or("");
            let value = match (cell.is_empty(), layout.blank_cell) {
                (true, BlankCell::Zero) => 0.0,
                (true, BlankCell::Reject) => {
                    return Err(load_error(source, format!("{date}: '{feature}' is blank")));
                }
                (false, _) => cell.parse::<f64>().map_err(|_| {
                    load_error(
                        source,
                        format!("{date}: '{feature}' value '{cell}' is not a number"),
                    )
                })?,
            };
            values.push(value);
        }
        entries.push(HistoricalEntry::new(date, values));
    }

    log::info!(
        "loader: loaded {} rows from {}, skipped {} without a valid timestamp",
        entries.len(),
        source,
        skipped
    );
    HistoricalStore::new(layout.features.clone(), entries)
}

fn load_error(source: &str, reason: impl ToString) -> AcrError {
    AcrError::Load {
        path: source.to_string(),
        reason: reason.to_string(),
    }
}
