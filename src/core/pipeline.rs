use crate::core::table::{OutputTarget, TableReader, TableWriter};
use crate::core::{IdentityResolver, Pipeline, Resolution, RunSettings, RunSummary};
use crate::utils::error::{EtlError, Result};
use chrono::Utc;
use csv::StringRecord;
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    AwaitHeader,
    ColumnLookup,
    Streaming,
    Done,
    Failed,
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!("Pipeline state: {:?} -> {:?}", state, next);
    *state = next;
}

/// Exact, case-sensitive lookup; the first matching column wins.
pub fn locate_column(header: &StringRecord, column: &str) -> Result<usize> {
    header
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| EtlError::ColumnNotFound {
            column: column.to_string(),
        })
}

fn replace_field(record: &StringRecord, index: usize, value: &str) -> StringRecord {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| if i == index { value } else { field })
        .collect()
}

/// Rewrites one column of a table, replacing user IDs with display values.
///
/// Rows are handled strictly one at a time: read, resolve, write. A row
/// whose lookup comes back unresolved is dropped from the output; any error
/// from the resolver aborts the run.
pub struct ResolvePipeline<R: IdentityResolver> {
    resolver: R,
    settings: RunSettings,
}

impl<R: IdentityResolver> ResolvePipeline<R> {
    pub fn new(resolver: R, settings: RunSettings) -> Self {
        Self { resolver, settings }
    }

    /// Runs against the configured input and output files.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Processing data from file: {}", self.settings.input_path);

        let reader = TableReader::open(&self.settings.input_path)?;
        let output_path = self.settings.output_path.clone();
        let (writer, summary) = self
            .process(reader, move || TableWriter::create_or_stdout(&output_path))
            .await?;
        writer.finish()?;

        Ok(summary)
    }

    /// Drives the transformation over any reader. `open_output` is only
    /// called once the target column has been found, so a failed lookup
    /// leaves no output behind.
    pub async fn process<Rd, W, F>(
        &self,
        mut reader: TableReader<Rd>,
        open_output: F,
    ) -> Result<(TableWriter<W>, RunSummary)>
    where
        Rd: Read + Send,
        W: Write + Send,
        F: FnOnce() -> (TableWriter<W>, OutputTarget) + Send,
    {
        let mut state = PipelineState::AwaitHeader;
        match self.stream(&mut state, &mut reader, open_output).await {
            Ok(done) => Ok(done),
            Err(e) => {
                advance(&mut state, PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn stream<Rd, W, F>(
        &self,
        state: &mut PipelineState,
        reader: &mut TableReader<Rd>,
        open_output: F,
    ) -> Result<(TableWriter<W>, RunSummary)>
    where
        Rd: Read + Send,
        W: Write + Send,
        F: FnOnce() -> (TableWriter<W>, OutputTarget) + Send,
    {
        let started_at = Utc::now();

        let header = reader.read_header()?;
        tracing::debug!(
            "CSV Header: {}",
            header.iter().collect::<Vec<_>>().join(", ")
        );

        advance(state, PipelineState::ColumnLookup);
        let index = locate_column(&header, &self.settings.column)?;
        tracing::debug!("Selected column is at index: {} (zero-based)", index);

        advance(state, PipelineState::Streaming);
        let (mut writer, target) = open_output();
        tracing::info!("Writing output to: {}", target);
        writer.write_header(&header)?;

        let mut rows_read = 0u64;
        let mut rows_skipped = 0u64;

        while let Some(record) = reader.next_record()? {
            rows_read += 1;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            // Every row has the header's width, so the index is in range.
            let identifier = record.get(index).unwrap_or_default().to_string();
            tracing::debug!(
                "Current record: [ {} ]",
                record.iter().collect::<Vec<_>>().join(", ")
            );

            match self
                .resolver
                .resolve(&identifier, self.settings.display)
                .await?
            {
                Resolution::Resolved(value) => {
                    tracing::debug!("User data from Mattermost: {}", value);
                    writer.write_record(&replace_field(&record, index, &value))?;
                }
                Resolution::Unresolved { reason } => {
                    tracing::warn!(
                        "Error looking up user ID '{}' on line {} ({}) - skipping record",
                        identifier,
                        line,
                        reason
                    );
                    rows_skipped += 1;
                }
            }
        }

        advance(state, PipelineState::Done);

        let summary = RunSummary {
            rows_read,
            rows_written: writer.rows_written(),
            rows_skipped,
            output: target.to_string(),
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!("Records processed: {}", summary.rows_written);

        Ok((writer, summary))
    }
}

#[async_trait::async_trait]
impl<R: IdentityResolver> Pipeline for ResolvePipeline<R> {
    async fn execute(&self) -> Result<RunSummary> {
        self.run().await
    }
}
