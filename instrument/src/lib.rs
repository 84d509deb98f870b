//! Event journal for park simulation runs.
//!
//! A `tracing` subscriber that files every `info`/`warn` event into a table
//! named after the event's target (`turn`, `theft`, `npc_action`, ...). Each
//! event field becomes a typed column; columns appear the first time a field
//! is seen, so the schema follows whatever the simulation emits.
//!
//! ```ignore
//! // In simulation code:
//! tracing::info!(target: "theft", shop = "shop_emporium", items = 2u64, caught = true);
//!
//! // In a test:
//! let (_, journal) = instrument::record(|| world.teleport("fantasyland", None));
//! let caught = journal.table("theft").unwrap().bools("caught");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Record};
use tracing::{Event, Id, Level, Metadata, Subscriber};

/// One column of an event table.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn {
    U64(Vec<u64>),
    I64(Vec<i64>),
    F64(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl TypedColumn {
    pub fn len(&self) -> usize {
        match self {
            TypedColumn::U64(v) => v.len(),
            TypedColumn::I64(v) => v.len(),
            TypedColumn::F64(v) => v.len(),
            TypedColumn::Bool(v) => v.len(),
            TypedColumn::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the column's neutral value until it holds `rows` entries.
    fn fill_to(&mut self, rows: usize) {
        let missing = rows.saturating_sub(self.len());
        if missing == 0 {
            return;
        }
        match self {
            TypedColumn::U64(v) => v.resize(v.len() + missing, 0),
            TypedColumn::I64(v) => v.resize(v.len() + missing, 0),
            TypedColumn::F64(v) => v.resize(v.len() + missing, 0.0),
            TypedColumn::Bool(v) => v.resize(v.len() + missing, false),
            TypedColumn::Str(v) => v.resize(v.len() + missing, String::new()),
        }
    }
}

/// All events recorded under one target.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub columns: HashMap<String, TypedColumn>,
    pub row_count: usize,
}

impl EventTable {
    fn align(&mut self) {
        let rows = self.row_count;
        for column in self.columns.values_mut() {
            column.fill_to(rows);
        }
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.get(name)
    }

    /// String column values, empty if the column is missing or not textual.
    pub fn strings(&self, name: &str) -> Vec<&str> {
        match self.columns.get(name) {
            Some(TypedColumn::Str(v)) => v.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn u64s(&self, name: &str) -> Vec<u64> {
        match self.columns.get(name) {
            Some(TypedColumn::U64(v)) => v.clone(),
            Some(TypedColumn::I64(v)) => v.iter().map(|&x| x.max(0) as u64).collect(),
            _ => Vec::new(),
        }
    }

    pub fn f64s(&self, name: &str) -> Vec<f64> {
        match self.columns.get(name) {
            Some(TypedColumn::F64(v)) => v.clone(),
            Some(TypedColumn::U64(v)) => v.iter().map(|&x| x as f64).collect(),
            Some(TypedColumn::I64(v)) => v.iter().map(|&x| x as f64).collect(),
            _ => Vec::new(),
        }
    }

    pub fn bools(&self, name: &str) -> Vec<bool> {
        match self.columns.get(name) {
            Some(TypedColumn::Bool(v)) => v.clone(),
            _ => Vec::new(),
        }
    }
}

/// Tables keyed by tracing target.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub tables: HashMap<String, EventTable>,
}

impl Journal {
    pub fn table(&self, target: &str) -> Option<&EventTable> {
        self.tables.get(target)
    }

    /// Number of events recorded under `target`.
    pub fn count(&self, target: &str) -> usize {
        self.tables.get(target).map_or(0, |t| t.row_count)
    }
}

thread_local! {
    static JOURNAL: RefCell<Journal> = RefCell::default();
}

struct RowWriter<'a> {
    table: &'a mut EventTable,
    row: usize,
}

impl RowWriter<'_> {
    fn column(&mut self, field: &Field, empty: fn(usize) -> TypedColumn) -> &mut TypedColumn {
        let row = self.row;
        self.table
            .columns
            .entry(field.name().to_string())
            .or_insert_with(|| empty(row))
    }
}

impl Visit for RowWriter<'_> {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if let TypedColumn::U64(v) = self.column(field, |n| TypedColumn::U64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        if let TypedColumn::I64(v) = self.column(field, |n| TypedColumn::I64(vec![0; n])) {
            v.push(value);
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let TypedColumn::F64(v) = self.column(field, |n| TypedColumn::F64(vec![0.0; n])) {
            v.push(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if let TypedColumn::Bool(v) = self.column(field, |n| TypedColumn::Bool(vec![false; n])) {
            v.push(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if let TypedColumn::Str(v) =
            self.column(field, |n| TypedColumn::Str(vec![String::new(); n]))
        {
            v.push(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

/// Subscriber that files events into the thread-local journal.
pub struct EventSubscriber;

impl Subscriber for EventSubscriber {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        // warn and error are "more severe" than info, so they pass this check too
        metadata.is_event() && *metadata.level() <= Level::INFO
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let metadata = event.metadata();
        JOURNAL.with(|j| {
            let mut journal = j.borrow_mut();
            let table = journal
                .tables
                .entry(metadata.target().to_string())
                .or_default();

            table.align();
            let row = table.row_count;
            let mut writer = RowWriter { table: &mut *table, row };
            writer.record_str_level(metadata.level());
            event.record(&mut writer);
            table.row_count += 1;
            table.align();
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

impl RowWriter<'_> {
    fn record_str_level(&mut self, level: &Level) {
        let row = self.row;
        let column = self
            .table
            .columns
            .entry("level".to_string())
            .or_insert_with(|| TypedColumn::Str(vec![String::new(); row]));
        if let TypedColumn::Str(v) = column {
            v.push(level.to_string().to_ascii_lowercase());
        }
    }
}

/// Install the subscriber process-wide. Later calls are ignored.
pub fn install_subscriber() {
    let _ = tracing::subscriber::set_global_default(EventSubscriber);
}

/// Take everything recorded on this thread so far.
pub fn drain() -> Journal {
    JOURNAL.with(|j| std::mem::take(&mut *j.borrow_mut()))
}

pub fn clear() {
    JOURNAL.with(|j| *j.borrow_mut() = Journal::default());
}

/// Run `f` with the subscriber scoped to this thread and return what it logged.
pub fn record<T>(f: impl FnOnce() -> T) -> (T, Journal) {
    clear();
    let out = tracing::subscriber::with_default(EventSubscriber, f);
    (out, drain())
}

// === Polars export ===

use polars::prelude::*;

impl EventTable {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| match col {
                TypedColumn::U64(v) => Column::new(name.into(), v),
                TypedColumn::I64(v) => Column::new(name.into(), v),
                TypedColumn::F64(v) => Column::new(name.into(), v),
                TypedColumn::Bool(v) => Column::new(name.into(), v),
                TypedColumn::Str(v) => Column::new(name.into(), v),
            })
            .collect();
        DataFrame::new(columns)
    }
}

impl Journal {
    pub fn to_dataframes(&self) -> HashMap<String, DataFrame> {
        self.tables
            .iter()
            .filter_map(|(name, table)| table.to_dataframe().ok().map(|df| (name.clone(), df)))
            .collect()
    }
}

/// Write each frame to `{dir}/{target}.parquet`.
pub fn save_parquet(
    frames: &mut HashMap<String, DataFrame>,
    dir: &std::path::Path,
) -> PolarsResult<()> {
    let io_err = |e: std::io::Error| PolarsError::IO {
        error: e.into(),
        msg: None,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    for (target, df) in frames.iter_mut() {
        let file = std::fs::File::create(dir.join(format!("{target}.parquet"))).map_err(io_err)?;
        ParquetWriter::new(file).finish(df)?;
    }
    Ok(())
}

fn run_dir_name(label: &str) -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let label: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(60)
        .collect();
    format!("{secs}_{label}")
}

/// Records a whole session and dumps it as parquet when dropped.
///
/// Output goes to `{parent}/{unix_secs}_{label}/`, one file per target.
/// `frames()` drains early so a test can inspect the data before the dump.
pub struct ScopedRecorder {
    run_dir: std::path::PathBuf,
    frames: Option<HashMap<String, DataFrame>>,
}

impl ScopedRecorder {
    pub fn new(parent: impl Into<std::path::PathBuf>, label: &str) -> Self {
        clear();
        install_subscriber();
        Self {
            run_dir: parent.into().join(run_dir_name(label)),
            frames: None,
        }
    }

    pub fn frames(&mut self) -> &HashMap<String, DataFrame> {
        self.frames.get_or_insert_with(|| drain().to_dataframes())
    }

    pub fn run_dir(&self) -> &std::path::Path {
        &self.run_dir
    }
}

impl Drop for ScopedRecorder {
    fn drop(&mut self) {
        let mut frames = self.frames.take().unwrap_or_else(|| drain().to_dataframes());
        if frames.is_empty() {
            return;
        }
        if let Err(e) = save_parquet(&mut frames, &self.run_dir) {
            eprintln!("ScopedRecorder: could not write {}: {e}", self.run_dir.display());
        }
    }
}
