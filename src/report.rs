//! Sequencing report.
//!
//! Maps an optimized candidate's per-station ordering lists back to the
//! order numbers they came from, for display. Task ids are internal; the
//! report speaks in "Order N" terms, where N is the 1-based position of
//! the order in the demand file.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::input::DemandPlan;
use crate::models::TaskId;

/// Processing sequence of one station, as 1-based order numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSequence {
    /// Station name.
    pub station: String,
    /// Order numbers in processing sequence.
    pub orders: Vec<usize>,
}

/// Translates per-station ordering lists into order-number sequences.
///
/// `orderings[s]` must hold task ids of station `s`; ids not present in
/// the plan's station index are skipped. Stations beyond the plan's count
/// are ignored.
pub fn station_sequences(plan: &DemandPlan, orderings: &[Vec<TaskId>]) -> Vec<StationSequence> {
    plan.stations
        .iter()
        .zip(&plan.station_tasks)
        .zip(orderings)
        .map(|((station, station_ids), ordering)| {
            let orders = ordering
                .iter()
                .filter_map(|id| station_ids.iter().position(|s| s == id))
                .map(|position| position + 1)
                .collect();
            StationSequence {
                station: station.clone(),
                orders,
            }
        })
        .collect()
}

/// Formats sequences as one `STATION: Order a, Order b, ...` line each.
pub fn render(sequences: &[StationSequence]) -> String {
    let mut out = String::new();
    for sequence in sequences {
        let _ = write!(out, "{}:", sequence.station);
        let labels = sequence
            .orders
            .iter()
            .map(|order| format!("Order {order}"))
            .collect::<Vec<_>>()
            .join(", ");
        if !labels.is_empty() {
            let _ = write!(out, " {labels}");
        }
        out.push('\n');
    }
    out
}
