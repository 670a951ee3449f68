//! Turns source records into output rows, following reference fields into
//! their target tables.

use crate::{Config, Fetcher};

use async_recursion::async_recursion;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::{Arc, Mutex, PoisonError};
use tablelink_core::{
    FieldSpec, Record, RecordKey, Result, Row, TableOptions, Value, Warning,
};

#[derive(Debug)]
pub struct Resolver<'a> {
    fetcher: Fetcher<'a>,
    config: &'a Config,

    /// Warnings raised so far, in the order they were found per record
    warnings: Mutex<Vec<Warning>>,
}

impl<'a> Resolver<'a> {
    pub fn new(fetcher: Fetcher<'a>, config: &'a Config) -> Self {
        Self {
            fetcher,
            config,
            warnings: Mutex::new(vec![]),
        }
    }

    /// Resolves every record, keeping the input order.
    ///
    /// Up to `record_concurrency` records are in flight at once. The first
    /// error aborts the whole batch.
    pub async fn resolve_all(&self, records: &[Arc<Record>], options: &TableOptions) -> Result<Vec<Row>> {
        stream::iter(records)
            .map(|record| self.resolve_record(record, options))
            .buffered(self.config.record_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Builds the output row for one record.
    ///
    /// Fields are emitted in declaration order. Reference fields become the
    /// list of resolved rows of the ids they hold, fetched one id at a time.
    /// Shape problems are recorded as warnings and resolve to empty values;
    /// failed lookups are returned as errors.
    pub async fn resolve_record(&self, record: &Record, options: &TableOptions) -> Result<Row> {
        let mut path = vec![RecordKey::new(&options.table, &record.id)];
        self.resolve_in(record, options, &mut path).await
    }

    /// Takes the warnings raised since the last call.
    pub fn take_warnings(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// `path` holds the keys of the records from the top-level record down
    /// to `record`, inclusive.
    #[async_recursion]
    async fn resolve_in(
        &self,
        record: &Record,
        options: &TableOptions,
        path: &mut Vec<RecordKey>,
    ) -> Result<Row> {
        let Some(specs) = options.fields.as_specs() else {
            self.warn(Warning::MalformedFields {
                record: RecordKey::new(&options.table, &record.id),
            });
            return Ok(Row::new());
        };

        let mut row = Row::new();

        for spec in specs {
            match spec {
                FieldSpec::Direct { source, output } => {
                    let value = record.get(source).cloned().unwrap_or_default();
                    row.insert(output.clone(), value);
                }
                FieldSpec::Resolved {
                    source,
                    output,
                    nested,
                } => {
                    let rows = self
                        .resolve_field(record, options, source, nested, path)
                        .await?;
                    row.insert(output.clone(), rows);
                }
            }
        }

        Ok(row)
    }

    async fn resolve_field(
        &self,
        record: &Record,
        options: &TableOptions,
        source: &str,
        nested: &TableOptions,
        path: &mut Vec<RecordKey>,
    ) -> Result<Vec<Row>> {
        let value = record.get(source).unwrap_or(&Value::Null);

        let Some(ids) = value.to_record_ids() else {
            self.warn(Warning::NotAList {
                record: RecordKey::new(&options.table, &record.id),
                field: source.to_string(),
                found: value.kind_name(),
            });
            return Ok(vec![]);
        };

        if ids.is_empty() {
            return Ok(vec![]);
        }

        if path.len() > self.config.max_depth {
            self.warn(Warning::DepthExceeded {
                record: RecordKey::new(&options.table, &record.id),
                field: source.to_string(),
                depth: path.len(),
            });
            return Ok(vec![]);
        }

        let mut rows = Vec::with_capacity(ids.len());

        // One id at a time: the remote source rate-limits per base.
        for id in ids {
            let target = RecordKey::new(&nested.table, id);

            if path.contains(&target) {
                self.warn(Warning::Cycle {
                    record: RecordKey::new(&options.table, &record.id),
                    field: source.to_string(),
                    target,
                });
                continue;
            }

            let fetched = self
                .fetcher
                .select_one(id, &nested.table)
                .await
                .map_err(|err| {
                    err.context(format!(
                        "resolving field `{source}` of record `{}` in {}",
                        record.id, options.table
                    ))
                })?;

            path.push(target);
            let resolved = self.resolve_in(&fetched, nested, path).await;
            path.pop();

            rows.push(resolved?);
        }

        Ok(rows)
    }

    fn warn(&self, warning: Warning) {
        tracing::warn!(record = %warning.record(), "{warning}");
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }
}
