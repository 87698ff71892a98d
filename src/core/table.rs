use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};

/// Forward-only reader over a delimited table whose first row is the header.
pub struct TableReader<R: Read> {
    reader: csv::Reader<R>,
}

impl TableReader<File> {
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path).map_err(|source| EtlError::InputUnavailable {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> TableReader<R> {
    pub fn from_reader(reader: R) -> Self {
        // The header is read as an ordinary record so that an empty source
        // can be told apart from a header-only one. `flexible(false)` makes
        // every later row match the header's width.
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(reader);
        Self { reader }
    }

    pub fn read_header(&mut self) -> Result<StringRecord> {
        let mut header = StringRecord::new();
        if self.reader.read_record(&mut header).map_err(map_csv_error)? {
            Ok(header)
        } else {
            Err(EtlError::NoHeader)
        }
    }

    /// Next data row, or `None` once the source is exhausted.
    pub fn next_record(&mut self) -> Result<Option<StringRecord>> {
        let mut record = StringRecord::new();
        if self.reader.read_record(&mut record).map_err(map_csv_error)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}

fn map_csv_error(err: csv::Error) -> EtlError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return EtlError::MalformedRow {
            line: pos.as_ref().map(|p| p.line()).unwrap_or_default(),
            expected: *expected_len,
            found: *len,
        };
    }
    EtlError::CsvError(err)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(String),
    Stdout,
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::File(path) => f.write_str(path),
            OutputTarget::Stdout => f.write_str("<stdout>"),
        }
    }
}

/// Streaming table writer. Each row is flushed as soon as it is written.
pub struct TableWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

pub type DynWrite = Box<dyn Write + Send>;

impl TableWriter<DynWrite> {
    /// Creates `path`, or falls back to stdout when it cannot be created.
    pub fn create_or_stdout(path: &str) -> (Self, OutputTarget) {
        match File::create(path) {
            Ok(file) => (
                Self::from_writer(Box::new(file) as DynWrite),
                OutputTarget::File(path.to_string()),
            ),
            Err(e) => {
                tracing::warn!(
                    "Unable to create output file '{}' ({}) - writing to stdout",
                    path,
                    e
                );
                (
                    Self::from_writer(Box::new(std::io::stdout()) as DynWrite),
                    OutputTarget::Stdout,
                )
            }
        }
    }
}

impl<W: Write> TableWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        let writer = WriterBuilder::new().flexible(false).from_writer(writer);
        Self {
            writer,
            rows_written: 0,
        }
    }

    pub fn write_header(&mut self, header: &StringRecord) -> Result<()> {
        self.writer.write_record(header).map_err(map_csv_error)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_record(&mut self, record: &StringRecord) -> Result<()> {
        self.writer.write_record(record).map_err(map_csv_error)?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Data rows written so far, header excluded.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }
}
