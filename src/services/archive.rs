// SPDX-License-Identifier: MIT

//! Bundle assembly: tabular exports, refreshed credentials, and diagnostics
//! packed into one downloadable archive.
//!
//! Artifact naming keeps subject outputs disjoint: every artifact is
//! prefixed with its subject id, except the single manifest. CSV bytes
//! start with a UTF-8 byte-order mark so spreadsheet software detects the
//! encoding.

use std::collections::BTreeSet;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CollectError, Result};
use crate::models::{Artifact, CollectionOutcome, DateRange, LevelEventRow, SummaryRow};

/// Name of the single unprefixed manifest artifact.
pub const MANIFEST_NAME: &str = "README.txt";

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Fixed columns of the summary table; stage columns follow, derived from
/// the data.
const SUMMARY_COLUMNS: [&str; 16] = [
    "subject_id",
    "log_id",
    "date_of_sleep",
    "start_time",
    "end_time",
    "duration_ms",
    "efficiency",
    "is_main_sleep",
    "sleep_type",
    "log_type",
    "minutes_asleep",
    "minutes_awake",
    "minutes_after_wakeup",
    "minutes_to_fall_asleep",
    "time_in_bed",
    "total_stage_minutes",
];

const LEVEL_COLUMNS: [&str; 6] = [
    "subject_id",
    "log_id",
    "date_of_sleep",
    "timestamp",
    "level",
    "seconds",
];

const MANIFEST: &str = "\
Fitbit sleep data export
========================

One set of files per subject, prefixed with the subject id.

<subject>_sleep_summary.csv
  One row per sleep session: subject_id, log_id, date_of_sleep, start_time,
  end_time, duration_ms, efficiency (the provider's sleep-efficiency
  percentage), is_main_sleep, sleep_type, log_type, minutes_asleep,
  minutes_awake, minutes_after_wakeup, minutes_to_fall_asleep, time_in_bed,
  total_stage_minutes, then <stage>_minutes / <stage>_count / <stage>_pct
  for every sleep stage present in the data. The stage column set follows
  the data; stages are not fixed in advance.

<subject>_sleep_levels.csv
  Fine-grained stage timeline: subject_id, log_id, date_of_sleep, timestamp,
  level, seconds. One row per recorded interval.

<subject>_sleep_levels_short.csv
  Short wake events, same columns as the fine-grained timeline.

<subject>_token.json
  The refreshed OAuth credential. Replace the subject's previous token file
  with this one: the old refresh token stops working after a refresh.

<subject>_*.txt
  Diagnostics: range probe result, skipped days, and failure details.

CSV files start with a UTF-8 byte-order mark so spreadsheet software picks
up the encoding.
";

/// The assembled bundle: a set of named artifacts plus the archive filename
/// (which encodes the requested date range).
#[derive(Debug, Clone)]
pub struct Bundle {
    pub file_name: String,
    pub artifacts: Vec<Artifact>,
}

impl Bundle {
    /// Find an artifact by name.
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }

    /// Serialize the bundle to a gzipped tar archive.
    pub fn to_tar_gz(&self) -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for artifact in &self.artifacts {
            let mut header = tar::Header::new_gnu();
            header.set_size(artifact.bytes.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, &artifact.name, artifact.bytes.as_slice())?;
        }

        let encoder = builder.into_inner()?;
        Ok(encoder.finish()?)
    }
}

/// Collects per-subject outcomes into one named-blob bundle.
pub struct ArchiveAssembler {
    include_diagnostics: bool,
}

impl ArchiveAssembler {
    pub fn new(include_diagnostics: bool) -> Self {
        Self {
            include_diagnostics,
        }
    }

    /// Assemble all outcomes into a bundle.
    ///
    /// Data tables are emitted only when non-empty; the refreshed
    /// credential is emitted whenever the refresh succeeded, independent of
    /// data success. Exactly one manifest describes the output schemas.
    pub fn assemble(&self, outcomes: &[CollectionOutcome], range: &DateRange) -> Result<Bundle> {
        let mut artifacts = Vec::new();

        for outcome in outcomes {
            let id = &outcome.subject_id;

            if !outcome.summary_rows.is_empty() {
                artifacts.push(Artifact {
                    name: format!("{}_sleep_summary.csv", id),
                    bytes: summary_csv(&outcome.summary_rows)?,
                });
            }
            if !outcome.level_data_rows.is_empty() {
                artifacts.push(Artifact {
                    name: format!("{}_sleep_levels.csv", id),
                    bytes: level_csv(&outcome.level_data_rows)?,
                });
            }
            if !outcome.level_short_rows.is_empty() {
                artifacts.push(Artifact {
                    name: format!("{}_sleep_levels_short.csv", id),
                    bytes: level_csv(&outcome.level_short_rows)?,
                });
            }

            if let Some(credential) = &outcome.updated_credential {
                let bytes = serde_json::to_vec_pretty(credential).map_err(|e| {
                    CollectError::Internal(anyhow::anyhow!(
                        "failed to serialize credential: {}",
                        e
                    ))
                })?;
                artifacts.push(Artifact {
                    name: format!("{}_token.json", id),
                    bytes,
                });
            }

            if self.include_diagnostics {
                for diagnostic in &outcome.diagnostics {
                    artifacts.push(Artifact {
                        name: format!("{}_{}", id, diagnostic.name),
                        bytes: diagnostic.bytes.clone(),
                    });
                }
            }
        }

        artifacts.push(Artifact::text(MANIFEST_NAME, MANIFEST));

        Ok(Bundle {
            file_name: format!("fitbit_sleep_data_{}.tar.gz", range.label()),
            artifacts,
        })
    }
}

/// Render the summary table.
///
/// The header is the fixed column list plus the union of stage columns
/// across all rows (the stage set is open); rows lacking a stage leave its
/// cells blank.
fn summary_csv(rows: &[SummaryRow]) -> Result<Vec<u8>> {
    let stage_names: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.stages.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());

    let mut header: Vec<String> = SUMMARY_COLUMNS.iter().map(|c| (*c).to_string()).collect();
    for stage in &stage_names {
        header.push(format!("{}_minutes", stage));
        header.push(format!("{}_count", stage));
        header.push(format!("{}_pct", stage));
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.subject_id.clone(),
            row.log_id.to_string(),
            row.date_of_sleep.clone(),
            row.start_time.clone(),
            row.end_time.clone(),
            row.duration_ms.to_string(),
            opt_cell(row.efficiency),
            row.is_main_sleep.to_string(),
            row.sleep_type.clone().unwrap_or_default(),
            row.log_type.clone().unwrap_or_default(),
            opt_cell(row.minutes_asleep),
            opt_cell(row.minutes_awake),
            opt_cell(row.minutes_after_wakeup),
            opt_cell(row.minutes_to_fall_asleep),
            opt_cell(row.time_in_bed),
            row.total_stage_minutes.to_string(),
        ];

        for stage in &stage_names {
            match row.stages.get(*stage) {
                Some(cells) => {
                    record.push(cells.minutes.to_string());
                    record.push(cells.count.to_string());
                    record.push(
                        cells
                            .pct
                            .map(|pct| format!("{:.1}", pct))
                            .unwrap_or_default(),
                    );
                }
                None => record.extend([String::new(), String::new(), String::new()]),
            }
        }

        writer.write_record(&record)?;
    }

    finish_csv(writer)
}

/// Render a level timeline table (fine-grained and short share the shape).
fn level_csv(rows: &[LevelEventRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(LEVEL_COLUMNS)?;

    for row in rows {
        writer.write_record([
            row.subject_id.as_str(),
            &row.log_id.to_string(),
            &row.date_of_sleep,
            &row.timestamp,
            &row.level,
            &row.seconds.to_string(),
        ])?;
    }

    finish_csv(writer)
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| CollectError::Internal(anyhow::anyhow!("CSV flush failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageCells;
    use std::collections::BTreeMap;

    fn make_summary_row(subject_id: &str, log_id: u64, stages: &[(&str, u64, u32)]) -> SummaryRow {
        let total = stages.iter().map(|(_, minutes, _)| minutes).sum();
        SummaryRow {
            subject_id: subject_id.to_string(),
            log_id,
            date_of_sleep: "2024-03-01".to_string(),
            start_time: "2024-02-29T23:10:00.000".to_string(),
            end_time: "2024-03-01T07:02:30.000".to_string(),
            duration_ms: 28_320_000,
            efficiency: Some(92),
            is_main_sleep: true,
            sleep_type: Some("stages".to_string()),
            log_type: Some("auto_detected".to_string()),
            minutes_asleep: Some(420),
            minutes_awake: Some(52),
            minutes_after_wakeup: None,
            minutes_to_fall_asleep: None,
            time_in_bed: Some(472),
            total_stage_minutes: total,
            stages: stages
                .iter()
                .map(|(name, minutes, count)| {
                    (
                        (*name).to_string(),
                        StageCells {
                            minutes: *minutes,
                            count: *count,
                            pct: (total > 0)
                                .then(|| (*minutes as f64 / total as f64 * 1000.0).round() / 10.0),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_summary_csv_starts_with_bom() {
        let rows = vec![make_summary_row("Y001", 1, &[("deep", 60, 1)])];
        let bytes = summary_csv(&rows).expect("render");
        assert_eq!(&bytes[..3], UTF8_BOM);
    }

    #[test]
    fn test_summary_csv_union_of_stage_columns() {
        // Row 1 has deep only, row 2 has rem only: the header carries both
        // and each row blanks the stage it lacks.
        let rows = vec![
            make_summary_row("Y001", 1, &[("deep", 60, 1)]),
            make_summary_row("Y001", 2, &[("rem", 90, 5)]),
        ];
        let bytes = summary_csv(&rows).expect("render");
        let text = String::from_utf8(bytes[3..].to_vec()).expect("utf-8");
        let mut lines = text.lines();

        let header = lines.next().expect("header line");
        assert!(header.ends_with(
            "total_stage_minutes,deep_minutes,deep_count,deep_pct,rem_minutes,rem_count,rem_pct"
        ));

        let row1 = lines.next().expect("first row");
        assert!(row1.ends_with("60,60,1,100.0,,,"));
        let row2 = lines.next().expect("second row");
        assert!(row2.ends_with("90,,,,90,5,100.0"));
    }

    #[test]
    fn test_level_csv_shape() {
        let rows = vec![LevelEventRow {
            subject_id: "Y001".to_string(),
            log_id: 7,
            date_of_sleep: "2024-03-01".to_string(),
            timestamp: "2024-03-01T02:13:30.000".to_string(),
            level: "wake".to_string(),
            seconds: 30,
        }];
        let bytes = level_csv(&rows).expect("render");
        let text = String::from_utf8(bytes[3..].to_vec()).expect("utf-8");
        assert_eq!(
            text,
            "subject_id,log_id,date_of_sleep,timestamp,level,seconds\n\
             Y001,7,2024-03-01,2024-03-01T02:13:30.000,wake,30\n"
        );
    }
}
