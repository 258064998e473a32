// SPDX-License-Identifier: MIT

//! Flattening of nested sleep log records into tabular rows.
//!
//! One raw record becomes:
//! 1. A summary row with per-stage minutes/count/percentage columns
//! 2. Fine-grained timeline rows, one per element of `levels.data`
//! 3. Short-event rows, one per element of `levels.shortData`
//!
//! Pure functions, no I/O. Flattening the same record twice yields
//! identical rows.

use std::collections::BTreeMap;

use crate::models::{LevelEvent, LevelEventRow, SleepLogRecord, StageCells, SummaryRow};

/// The three row shapes derived from one sleep log record.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedRecord {
    pub summary: SummaryRow,
    pub level_data: Vec<LevelEventRow>,
    pub level_short: Vec<LevelEventRow>,
}

/// Flatten one raw record into its three row shapes.
pub fn flatten(subject_id: &str, record: &SleepLogRecord) -> FlattenedRecord {
    let (total_stage_minutes, stages) = stage_aggregates(record);

    let summary = SummaryRow {
        subject_id: subject_id.to_string(),
        log_id: record.log_id,
        date_of_sleep: record.date_of_sleep.clone(),
        start_time: record.start_time.clone(),
        end_time: record.end_time.clone(),
        duration_ms: record.duration,
        efficiency: record.efficiency,
        is_main_sleep: record.is_main_sleep,
        sleep_type: record.sleep_type.clone(),
        log_type: record.log_type.clone(),
        minutes_asleep: record.minutes_asleep,
        minutes_awake: record.minutes_awake,
        minutes_after_wakeup: record.minutes_after_wakeup,
        minutes_to_fall_asleep: record.minutes_to_fall_asleep,
        time_in_bed: record.time_in_bed,
        total_stage_minutes,
        stages,
    };

    let (level_data, level_short) = match &record.levels {
        Some(levels) => (
            level_rows(subject_id, record, &levels.data),
            level_rows(subject_id, record, &levels.short_data),
        ),
        None => (Vec::new(), Vec::new()),
    };

    FlattenedRecord {
        summary,
        level_data,
        level_short,
    }
}

/// Aggregate whatever stages the record carries.
///
/// The stage set is provider-determined, so this iterates the summary map
/// dynamically instead of assuming deep/light/rem/wake. Percentages are
/// computed only when the total is positive; a zero total leaves every
/// `pct` empty rather than dividing by zero.
fn stage_aggregates(record: &SleepLogRecord) -> (u64, BTreeMap<String, StageCells>) {
    let summary = match &record.levels {
        Some(levels) => &levels.summary,
        None => return (0, BTreeMap::new()),
    };

    let total: u64 = summary.values().map(|stage| stage.minutes).sum();

    let stages = summary
        .iter()
        .map(|(name, stage)| {
            let pct = if total > 0 {
                Some(round1(stage.minutes as f64 / total as f64 * 100.0))
            } else {
                None
            };
            (
                name.clone(),
                StageCells {
                    minutes: stage.minutes,
                    count: stage.count,
                    pct,
                },
            )
        })
        .collect();

    (total, stages)
}

/// One row per timeline element.
fn level_rows(
    subject_id: &str,
    record: &SleepLogRecord,
    events: &[LevelEvent],
) -> Vec<LevelEventRow> {
    events
        .iter()
        .map(|event| LevelEventRow {
            subject_id: subject_id.to_string(),
            log_id: record.log_id,
            date_of_sleep: record.date_of_sleep.clone(),
            timestamp: event.date_time.clone(),
            level: event.level.clone(),
            seconds: event.seconds,
        })
        .collect()
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
