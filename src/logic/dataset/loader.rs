//! Reference dataset download & parsing
//!
//! HTTP GET (blocking, bounded timeout) -> 25 % CSV sample -> schema pass.

use std::collections::HashMap;
use std::io::Read;
use std::time::Duration;

use super::frame::Dataset;
use super::sample;
use super::schema::{self, UnmappedPolicy};
use super::DatasetError;
use crate::constants;
use crate::logic::features::FeatureValue;

/// Where and how to load the reference data
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub sample_fraction: f64,
    pub sample_seed: u64,
    pub unmapped_policy: UnmappedPolicy,
}

impl DatasetConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: constants::DEFAULT_DATASET_TIMEOUT,
            sample_fraction: constants::REFERENCE_SAMPLE_FRACTION,
            sample_seed: constants::REFERENCE_SAMPLE_SEED,
            unmapped_policy: UnmappedPolicy::default(),
        }
    }

    pub fn from_env() -> Self {
        let unmapped_policy = constants::get_unmapped_policy()
            .parse()
            .unwrap_or_else(|e| {
                log::warn!("{} - falling back to 'missing'", e);
                UnmappedPolicy::Missing
            });

        Self {
            timeout_seconds: constants::get_dataset_timeout(),
            unmapped_policy,
            ..Self::new(constants::get_reference_data_url())
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Download, validate and sample the reference dataset (uncached)
pub fn fetch(config: &DatasetConfig) -> Result<Dataset, DatasetError> {
    log::info!("Downloading reference data from {}", config.url);

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build();

    let response = match agent.get(&config.url).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => return Err(DatasetError::Fetch { status }),
        Err(e) => return Err(DatasetError::Transport(e.to_string())),
    };

    let status = response.status();
    if !(200..300).contains(&status) {
        return Err(DatasetError::Fetch { status });
    }

    // Raw body only; rows are parsed into values once they are known to be kept
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| DatasetError::Transport(e.to_string()))?;

    let (mut dataset, full_rows) =
        parse_csv_sampled(body.as_slice(), config.sample_fraction, config.sample_seed)?;
    drop(body);

    let report = schema::apply(&mut dataset, config.unmapped_policy)?;
    log::debug!("Schema pass: renamed {:?}, unmapped {:?}", report.renamed, report.unmapped);

    log::info!(
        "Reference data ready: {} of {} rows kept, {} columns",
        dataset.len(),
        full_rows,
        dataset.columns().len()
    );

    Ok(dataset)
}

/// Parse a CSV payload with a header row
pub fn parse_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    read_rows(reader, None)
}

/// Parse a reproducible `fraction` of the rows of a CSV payload.
///
/// Two passes: the first only counts records, the second converts the kept
/// ones. Returns the sample (re-indexed from zero, in draw order) and the
/// size of the full table.
pub fn parse_csv_sampled(
    payload: &[u8],
    fraction: f64,
    seed: u64,
) -> Result<(Dataset, usize), DatasetError> {
    let population = count_records(payload)?;
    let count = sample::fraction_count(population, fraction);
    let picked = sample::sample_indices(population, count, seed);

    Ok((read_rows(payload, Some(&picked))?, population))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().has_headers(true).from_reader(reader)
}

fn count_records(payload: &[u8]) -> Result<usize, DatasetError> {
    let mut rdr = csv_reader(payload);
    let mut record = csv::StringRecord::new();
    let mut count = 0;
    while rdr.read_record(&mut record).map_err(map_csv_error)? {
        count += 1;
    }
    Ok(count)
}

/// Read every row, or only the `picked` ones (kept in `picked` order)
fn read_rows<R: Read>(reader: R, picked: Option<&[usize]>) -> Result<Dataset, DatasetError> {
    let mut rdr = csv_reader(reader);

    let headers = rdr.headers().map_err(map_csv_error)?.clone();
    if headers.is_empty() {
        return Err(DatasetError::Parse("empty payload (no header row)".to_string()));
    }
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    let slots: Option<HashMap<usize, usize>> =
        picked.map(|p| p.iter().enumerate().map(|(slot, &row)| (row, slot)).collect());
    let mut kept: Vec<Option<Vec<FeatureValue>>> = vec![None; picked.map_or(0, |p| p.len())];
    let mut rows: Vec<Vec<FeatureValue>> = Vec::new();

    let mut record = csv::StringRecord::new();
    let mut index = 0;
    while rdr.read_record(&mut record).map_err(map_csv_error)? {
        match &slots {
            None => rows.push(record.iter().map(FeatureValue::parse_cell).collect()),
            Some(slots) => {
                if let Some(&slot) = slots.get(&index) {
                    kept[slot] = Some(record.iter().map(FeatureValue::parse_cell).collect());
                }
            }
        }
        index += 1;
    }

    if slots.is_some() {
        rows = kept.into_iter().flatten().collect();
    }
    Dataset::from_rows(columns, rows)
}

/// I/O while streaming the body is a transport failure; anything else is a
/// malformed payload
fn map_csv_error(e: csv::Error) -> DatasetError {
    if e.is_io_error() {
        DatasetError::Transport(e.to_string())
    } else {
        DatasetError::Parse(e.to_string())
    }
}
