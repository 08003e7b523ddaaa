//! Property-Based Test Generators
//!
//! Proptest strategies covering the full (stage, status) space.

use domain_sales::{ProcessStatus, SalesProcess, Stage};
use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;

use crate::builders::SalesProcessBuilder;

pub fn stage_strategy() -> impl Strategy<Value = Stage> {
    select(Stage::ALL.to_vec())
}

pub fn status_strategy() -> impl Strategy<Value = ProcessStatus> {
    select(ProcessStatus::ALL.to_vec())
}

/// Any of the 15 (stage, status) combinations
pub fn coordinates_strategy() -> impl Strategy<Value = (Stage, ProcessStatus)> {
    (stage_strategy(), status_strategy())
}

/// Stage pairs where `to` is not the immediate successor of `from`
pub fn non_adjacent_stage_pair_strategy() -> impl Strategy<Value = (Stage, Stage)> {
    (stage_strategy(), stage_strategy()).prop_filter("adjacent pair", |(from, to)| from.next() != Some(*to))
}

/// Estimated values between 0 and 1,000,000.00
pub fn value_strategy() -> impl Strategy<Value = Option<Decimal>> {
    proptest::option::of((0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2)))
}

/// Processes at arbitrary coordinates with arbitrary values
pub fn process_strategy() -> impl Strategy<Value = SalesProcess> {
    (coordinates_strategy(), value_strategy()).prop_map(|((stage, status), value)| {
        SalesProcessBuilder::new()
            .at(stage)
            .with_status(status)
            .with_value(value)
            .build()
    })
}

pub fn processes_strategy(max: usize) -> impl Strategy<Value = Vec<SalesProcess>> {
    proptest::collection::vec(process_strategy(), 0..=max)
}
