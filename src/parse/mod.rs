// src/parse/mod.rs
use arrow::{
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use regex::Regex;
use std::{collections::BTreeMap, io::Cursor, sync::Arc};
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, Result};

mod table;

pub use table::Table;

const DEFAULT_BATCH_SIZE: usize = 8192;

/// Knobs forwarded to the Arrow CSV reader.
///
/// The defaults read a plain comma-separated export with a header on the
/// first line, empty fields as nulls, and types inferred from every row.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub delimiter: u8,
    pub quote: u8,
    pub escape: Option<u8>,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
    pub has_header: bool,
    /// Lines to drop before the header (or the first data row when `has_header` is false).
    /// Counts physical `\n`-terminated lines; quoting in the skipped preamble is not honoured.
    pub skip_rows: usize,
    /// Fields matching this pattern are read as null. `None` means "empty field".
    pub null_regex: Option<Regex>,
    /// Per-column types that replace whatever inference picked.
    pub dtypes: BTreeMap<String, DataType>,
    /// Keep only these columns, in this order.
    pub usecols: Option<Vec<String>>,
    /// Rows sampled for type inference. `None` reads the whole body.
    pub infer_max_records: Option<usize>,
    pub batch_size: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            has_header: true,
            skip_rows: 0,
            null_regex: None,
            dtypes: BTreeMap::new(),
            usecols: None,
            infer_max_records: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ParseOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_dtype(mut self, column: impl Into<String>, data_type: DataType) -> Self {
        self.dtypes.insert(column.into(), data_type);
        self
    }

    pub fn with_usecols<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usecols = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    fn format(&self) -> Format {
        let mut format = Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_quote(self.quote);
        if let Some(escape) = self.escape {
            format = format.with_escape(escape);
        }
        if let Some(comment) = self.comment {
            format = format.with_comment(comment);
        }
        if let Some(null_regex) = &self.null_regex {
            format = format.with_null_regex(null_regex.clone());
        }
        format
    }
}

/// Decode a UTF-8 CSV body into a [`Table`], inferring a type per column.
#[instrument(level = "debug", skip(raw, options), fields(bytes = raw.len()))]
pub fn parse_csv(raw: &[u8], options: &ParseOptions) -> Result<Table> {
    let text = std::str::from_utf8(raw)?;
    let body = skip_lines(text, options.skip_rows);
    if body.trim().is_empty() {
        return Err(FetchError::EmptyExport);
    }

    let format = options.format();
    let (inferred, sampled) = format.infer_schema(Cursor::new(body), options.infer_max_records)?;
    debug!(
        columns = inferred.fields().len(),
        sampled, "inferred CSV schema"
    );

    let schema = Arc::new(apply_dtypes(inferred, &options.dtypes));
    let mut builder = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .with_batch_size(options.batch_size.max(1));

    let out_schema = match &options.usecols {
        Some(columns) => {
            let projection = projection_indices(&schema, columns)?;
            let projected = Arc::new(schema.project(&projection)?);
            builder = builder.with_projection(projection);
            projected
        }
        None => schema,
    };

    let reader = builder.build(Cursor::new(body))?;
    let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

    let table = Table::new(out_schema, batches);
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "parsed CSV"
    );
    Ok(table)
}

fn skip_lines(text: &str, n: usize) -> &str {
    let mut rest = text;
    for _ in 0..n {
        match rest.find('\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return "",
        }
    }
    rest
}

fn apply_dtypes(inferred: Schema, dtypes: &BTreeMap<String, DataType>) -> Schema {
    for name in dtypes.keys() {
        if inferred.field_with_name(name).is_err() {
            warn!(column = %name, "dtype override names a column that is not in the export");
        }
    }

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|f| match dtypes.get(f.name()) {
            Some(dt) => Field::new(f.name(), dt.clone(), true),
            None => f.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}

fn projection_indices(schema: &Schema, columns: &[String]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| FetchError::UnknownColumn(name.clone()))
        })
        .collect()
}
