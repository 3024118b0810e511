//! Aggregate the recoveries register and join it onto windowed loss events

use crate::register::{LossEvent, RecoveryRecord};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Recoveries of one reference, collapsed to a single row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecovery {
    pub reference: String,

    /// Sum of insurance + other recoveries over all rows
    pub recovery_amount: f64,

    /// Latest recovery date among rows that carry one
    pub latest_date: Option<NaiveDate>,

    /// First non-empty recovery account category in register order
    pub account_category: Option<String>,
}

/// Loss event with its recoveries and net loss attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedEvent {
    pub reference: String,
    pub registration_date: NaiveDate,
    pub recovery_date: Option<NaiveDate>,
    pub gross_loss: f64,
    pub recovered: f64,
    /// gross_loss - recovered, not floored at zero
    pub net_loss: f64,
    pub risk_class_code: Option<u32>,
    pub account_category: String,
    /// Empty when the reference has no recoveries
    pub recovery_account_category: String,
}

/// Collapse the recoveries register to one row per reference
pub fn aggregate_recoveries(records: &[RecoveryRecord]) -> BTreeMap<String, AggregatedRecovery> {
    let mut aggregated: BTreeMap<String, AggregatedRecovery> = BTreeMap::new();

    for record in records {
        let entry = aggregated
            .entry(record.reference.clone())
            .or_insert_with(|| AggregatedRecovery {
                reference: record.reference.clone(),
                recovery_amount: 0.0,
                latest_date: None,
                account_category: None,
            });

        entry.recovery_amount += record.recovery_amount();
        entry.latest_date = entry.latest_date.max(record.recovery_date);
        if entry.account_category.is_none() {
            entry.account_category = record.account_category.clone();
        }
    }

    aggregated
}

/// Left-join aggregated recoveries onto loss events by reference.
/// Produces exactly one enriched row per input event.
pub fn join_recoveries(
    events: &[LossEvent],
    recoveries: &BTreeMap<String, AggregatedRecovery>,
) -> Vec<EnrichedEvent> {
    let mut matched = 0usize;

    let enriched: Vec<EnrichedEvent> = events
        .iter()
        .map(|event| {
            let recovery = recoveries.get(&event.reference);
            if recovery.is_some() {
                matched += 1;
            }
            let recovered = recovery.map_or(0.0, |r| r.recovery_amount);

            EnrichedEvent {
                reference: event.reference.clone(),
                registration_date: event.registration_date,
                recovery_date: recovery.and_then(|r| r.latest_date),
                gross_loss: event.gross_loss,
                recovered,
                net_loss: event.gross_loss - recovered,
                risk_class_code: event.risk_class_code,
                account_category: event.account_category.clone(),
                recovery_account_category: recovery
                    .and_then(|r| r.account_category.clone())
                    .unwrap_or_default(),
            }
        })
        .collect();

    debug!(
        "Joined recoveries: {} of {} loss rows matched a recovered reference",
        matched,
        enriched.len()
    );

    enriched
}
