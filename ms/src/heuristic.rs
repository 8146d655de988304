//! Pass-through sufficiency heuristic
//!
//! Decides from sampled value pairs whether copying the source value as-is
//! already reproduces the target values, so the suggestion service only
//! gets asked when a real transformation is likely needed.

use serde_json::Value;
use tracing::debug;

use crate::domain::{RealValue, TargetType};
use crate::pairs::ValuePair;

/// Why copying as-is was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThroughReason {
    /// No value pairs were sampled
    NoData,
    /// Every pair is empty (or all-null) on at least one side
    NothingToCompare,
    /// Converted source values equal the target values in every pair
    ValuesEquivalent,
    /// No sampled subject has a target value yet
    TargetDataMissing,
}

/// Outcome of the heuristic for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    PassThrough(PassThroughReason),
    NeedsExternalSuggestion,
}

/// Run the decision chain; the first matching rule wins
pub fn decide(pairs: &[ValuePair], target_type: TargetType) -> Decision {
    if pairs.is_empty() {
        debug!("decide: no value pairs, using as-is");
        return Decision::PassThrough(PassThroughReason::NoData);
    }

    if pairs
        .iter()
        .all(|p| all_null(&p.source_values) || all_null(&p.target_values))
    {
        debug!("decide: all source or target values are empty, using as-is");
        return Decision::PassThrough(PassThroughReason::NothingToCompare);
    }

    if does_as_is_suffice(pairs, target_type) {
        debug!("decide: as-is reproduces the sampled data, using it");
        return Decision::PassThrough(PassThroughReason::ValuesEquivalent);
    }

    if is_target_data_missing(pairs) {
        debug!("decide: target data missing, assuming not populated yet, using as-is");
        return Decision::PassThrough(PassThroughReason::TargetDataMissing);
    }

    debug!(pair_count = pairs.len(), "decide: external suggestion needed");
    Decision::NeedsExternalSuggestion
}

/// `true` if no transformation is needed for these pairs
pub fn is_pass_through_sufficient(pairs: &[ValuePair], target_type: TargetType) -> bool {
    matches!(decide(pairs, target_type), Decision::PassThrough(_))
}

/// `true` if the identity conversion reproduces the target values in every pair
pub fn does_as_is_suffice(pairs: &[ValuePair], target_type: TargetType) -> bool {
    pairs.iter().all(|pair| pair_equivalent(pair, target_type))
}

/// Structural equivalence of one pair
///
/// Sizes must match, every source value must convert into the target type,
/// and the converted values must equal the target values as a multiset.
pub fn pair_equivalent(pair: &ValuePair, target_type: TargetType) -> bool {
    if pair.source_values.len() != pair.target_values.len() {
        return false;
    }

    let Some(expected) = convert_all(&pair.source_values, target_type) else {
        return false;
    };
    let Some(actual) = convert_all(&pair.target_values, target_type) else {
        return false;
    };

    unordered_equals(&expected, &actual)
}

/// Convert every value, dropping nulls; `None` as soon as one conversion fails
fn convert_all(values: &[Value], target_type: TargetType) -> Option<Vec<RealValue>> {
    let mut converted = Vec::with_capacity(values.len());
    for value in values {
        match target_type.convert(value) {
            Ok(Some(v)) => converted.push(v),
            Ok(None) => {}
            Err(e) => {
                debug!(error = %e, %value, "convert_all: conversion failed, assuming transformation is needed");
                return None;
            }
        }
    }
    Some(converted)
}

fn is_target_data_missing(pairs: &[ValuePair]) -> bool {
    pairs.iter().all(|p| p.target_values.is_empty())
}

fn all_null(values: &[Value]) -> bool {
    values.iter().all(Value::is_null)
}

/// Multiset equality: same elements with the same counts, any order
fn unordered_equals(left: &[RealValue], right: &[RealValue]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut remaining: Vec<&RealValue> = right.iter().collect();
    for value in left {
        match remaining.iter().position(|r| *r == value) {
            Some(idx) => {
                remaining.swap_remove(idx);
            }
            None => return false,
        }
    }
    true
}
