//! Capacity probe for the full-read path.
//!
//! Whether the whole source fits is decided by two checks, both deterministic:
//! a pre-read estimate from the file size, then a budget guard that is grown
//! for every materialized row (plus an optional row ceiling). Either one
//! failing yields `Materialization::Exhausted`; nothing is caught or unwound.

use std::fmt;
use std::io::Read;

use serde::Serialize;
use sieve_core::budget::{BudgetGuard, MemoryBudget};
use sieve_core::types::{Scalar, Table};
use sieve_io::CsvReader;

use crate::error::Result;

/// Why the full read was abandoned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExhaustionCause {
    /// The file-size estimate alone exceeds the cap; no row was read.
    EstimateExceedsCap { estimated_bytes: u64, cap_bytes: usize },
    /// The budget refused to grow while rows were being materialized.
    BudgetExceeded {
        rows_materialized: u64,
        requested_bytes: usize,
        cap_bytes: usize,
    },
    /// More rows than the configured ceiling.
    RowCeiling { ceiling: u64 },
}

impl fmt::Display for ExhaustionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExhaustionCause::EstimateExceedsCap {
                estimated_bytes,
                cap_bytes,
            } => write!(
                f,
                "estimated {} bytes in memory, cap is {}",
                estimated_bytes, cap_bytes
            ),
            ExhaustionCause::BudgetExceeded {
                rows_materialized,
                requested_bytes,
                cap_bytes,
            } => write!(
                f,
                "budget of {} bytes exhausted after {} rows (wanted {})",
                cap_bytes, rows_materialized, requested_bytes
            ),
            ExhaustionCause::RowCeiling { ceiling } => {
                write!(f, "source has more than {} rows", ceiling)
            }
        }
    }
}

/// Outcome of trying to hold the entire source in memory.
#[derive(Debug)]
pub enum Materialization {
    Complete(Table),
    Exhausted(ExhaustionCause),
}

pub struct CapacityProbe<'a, B: MemoryBudget> {
    budget: &'a B,
    row_ceiling: Option<u64>,
    inflation_factor: f64,
}

impl<'a, B: MemoryBudget> CapacityProbe<'a, B> {
    pub fn new(budget: &'a B, row_ceiling: Option<u64>, inflation_factor: f64) -> Self {
        Self {
            budget,
            row_ceiling,
            inflation_factor,
        }
    }

    /// Pre-read verdict from the on-disk size. `None` means "go ahead and try".
    pub fn precheck(&self, source_bytes: u64) -> Option<ExhaustionCause> {
        let estimated = (source_bytes as f64 * self.inflation_factor).ceil();
        let cap = self.budget.capacity_bytes();
        if estimated > cap as f64 {
            Some(ExhaustionCause::EstimateExceedsCap {
                estimated_bytes: estimated as u64,
                cap_bytes: cap,
            })
        } else {
            None
        }
    }

    /// Read every remaining row of `reader`, charging each to the budget.
    ///
    /// Read and parse failures propagate as errors; running out of budget
    /// does not. On exhaustion the partial table is dropped here and the
    /// guard returns its bytes.
    pub fn materialize<R: Read>(&self, reader: &mut CsvReader<R>) -> Result<Materialization> {
        let cap = self.budget.capacity_bytes();
        let mut table = Table::empty(reader.schema());
        let header_bytes = table.estimated_bytes();

        let mut guard = match self.budget.try_acquire(header_bytes, "full_read") {
            Some(g) => g,
            None => {
                return Ok(Materialization::Exhausted(ExhaustionCause::BudgetExceeded {
                    rows_materialized: 0,
                    requested_bytes: header_bytes,
                    cap_bytes: cap,
                }))
            }
        };

        let mut rows = 0u64;
        while let Some(values) = reader.next_record()? {
            if let Some(ceiling) = self.row_ceiling {
                if rows >= ceiling {
                    tracing::debug!(ceiling, "row ceiling reached during full read");
                    return Ok(Materialization::Exhausted(ExhaustionCause::RowCeiling {
                        ceiling,
                    }));
                }
            }
            let row_bytes: usize = values.iter().map(Scalar::estimated_bytes).sum();
            let wanted = guard.bytes().saturating_add(row_bytes);
            if !guard.try_resize(wanted) {
                tracing::debug!(rows, wanted, cap, "budget refused full read");
                return Ok(Materialization::Exhausted(ExhaustionCause::BudgetExceeded {
                    rows_materialized: rows,
                    requested_bytes: wanted,
                    cap_bytes: cap,
                }));
            }
            table.push_record(values)?;
            rows += 1;
        }

        tracing::debug!(rows, bytes = guard.bytes(), "full read fits in budget");
        Ok(Materialization::Complete(table))
    }
}
