//! Demand-file parsing.
//!
//! Turns raw demand records into per-station task durations, one task per
//! station per order. The file is delimiter-separated with a header row;
//! an item row carries a quantity followed by per-station unit times, and
//! a marker row (first field equal to the order marker) closes the current
//! order. A station's duration for an order is the sum over its item rows
//! of `quantity * max(unit time over the station's columns)`.
//!
//! The parser also returns the station → task-id index the reporting layer
//! needs to label sequencing results; the solver core itself never reads it.

use std::io::Read;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bees::JobShopProblem;
use crate::models::{Task, TaskId};

/// Default marker for order-separator rows.
pub const DEFAULT_ORDER_MARKER: &str = "order";

/// Errors produced while reading a demand file.
#[derive(Debug, Error)]
pub enum InputError {
    /// The underlying reader or the record layout failed.
    #[error("failed to read demand file: {0}")]
    Csv(#[from] csv::Error),

    /// A field expected to be numeric did not parse.
    #[error("line {line}: cannot parse {value:?} as a number")]
    InvalidNumber {
        /// 1-based line in the demand file.
        line: u64,
        /// Offending field content.
        value: String,
    },

    /// An item row is shorter than a station's column list requires.
    #[error("line {line}: missing column {column}")]
    MissingColumn {
        /// 1-based line in the demand file.
        line: u64,
        /// 0-based index of the absent column.
        column: usize,
    },

    /// No stations were configured.
    #[error("no stations configured")]
    NoStations,
}

/// One station (machine/category) and the item-row columns that feed it.
///
/// An item contributes `quantity * max(columns)` to the station's running
/// duration for the current order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationSpec {
    /// Station name, used for reporting.
    pub name: String,
    /// 0-based columns of an item row holding this station's unit times.
    pub columns: Vec<usize>,
}

impl StationSpec {
    /// Creates a station spec.
    pub fn new(name: impl Into<String>, columns: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// Parsed demand data: the flat task list plus the station index.
///
/// Tasks are job-major: order `k` occupies the `k`-th run of
/// `stations.len()` consecutive tasks, one per station in station order,
/// which is exactly the layout [`JobShopProblem`] expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandPlan {
    /// All tasks, job-major.
    pub tasks: Vec<Task>,
    /// Station names, index = category.
    pub stations: Vec<String>,
    /// Task ids per station, in order number sequence.
    pub station_tasks: Vec<Vec<TaskId>>,
}

impl DemandPlan {
    /// Number of orders parsed.
    pub fn orders(&self) -> usize {
        self.station_tasks.first().map_or(0, Vec::len)
    }

    /// Builds the optimizer's problem instance from this plan.
    pub fn to_problem(&self) -> JobShopProblem {
        JobShopProblem::new(self.tasks.clone(), self.stations.len())
    }
}

/// Parses a `;`-delimited demand file with a header row.
///
/// Item rows after the last marker are flushed as a final order at
/// end-of-file. A marker row always closes an order, even an empty one.
pub fn parse_demands<R: Read>(
    reader: R,
    stations: &[StationSpec],
    order_marker: &str,
) -> Result<DemandPlan, InputError> {
    if stations.is_empty() {
        return Err(InputError::NoStations);
    }

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut tasks = Vec::new();
    let mut station_tasks = vec![Vec::new(); stations.len()];
    let mut accumulated = vec![0i64; stations.len()];
    let mut pending_items = false;
    let mut next_id = 1u32;

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let first = record.get(0).unwrap_or("");

        if first == order_marker {
            flush_order(&mut accumulated, &mut tasks, &mut station_tasks, &mut next_id);
            pending_items = false;
            continue;
        }

        let quantity = parse_number(first, line)?;
        for (station, spec) in stations.iter().enumerate() {
            let mut unit_time = 0i64;
            for &column in &spec.columns {
                let field = record
                    .get(column)
                    .ok_or(InputError::MissingColumn { line, column })?;
                unit_time = unit_time.max(parse_number(field, line)?);
            }
            accumulated[station] += quantity * unit_time;
        }
        pending_items = true;
    }

    if pending_items {
        flush_order(&mut accumulated, &mut tasks, &mut station_tasks, &mut next_id);
    }

    Ok(DemandPlan {
        tasks,
        stations: stations.iter().map(|s| s.name.clone()).collect(),
        station_tasks,
    })
}

/// Closes the current order: one task per station from the accumulated
/// durations, which are then reset.
fn flush_order(
    accumulated: &mut [i64],
    tasks: &mut Vec<Task>,
    station_tasks: &mut [Vec<TaskId>],
    next_id: &mut u32,
) {
    for (station, duration) in accumulated.iter_mut().enumerate() {
        let id = TaskId(*next_id);
        *next_id += 1;
        tasks.push(Task::new(id, *duration));
        station_tasks[station].push(id);
        *duration = 0;
    }
}

fn parse_number(value: &str, line: u64) -> Result<i64, InputError> {
    value.parse().map_err(|_| InputError::InvalidNumber {
        line,
        value: value.to_string(),
    })
}
