use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fitbit_sleep_collector::models::SleepLogRecord;
use fitbit_sleep_collector::services::flatten::flatten;
use serde_json::json;

/// A full night: four stages plus a realistic number of timeline events.
fn realistic_record() -> SleepLogRecord {
    let data: Vec<_> = (0..900)
        .map(|i| {
            let level = ["wake", "light", "deep", "rem"][i % 4];
            json!({
                "dateTime": format!("2024-03-01T00:{:02}:{:02}.000", (i / 60) % 60, i % 60),
                "level": level,
                "seconds": 30
            })
        })
        .collect();
    let short_data: Vec<_> = (0..20)
        .map(|i| {
            json!({
                "dateTime": format!("2024-03-01T02:{:02}:30.000", i),
                "level": "wake",
                "seconds": 30
            })
        })
        .collect();

    serde_json::from_value(json!({
        "logId": 26013218219u64,
        "dateOfSleep": "2024-03-01",
        "startTime": "2024-02-29T23:10:00.000",
        "endTime": "2024-03-01T07:02:30.000",
        "duration": 28_320_000u64,
        "efficiency": 92,
        "isMainSleep": true,
        "type": "stages",
        "logType": "auto_detected",
        "minutesAsleep": 420,
        "minutesAwake": 52,
        "minutesAfterWakeup": 2,
        "minutesToFallAsleep": 8,
        "timeInBed": 472,
        "levels": {
            "summary": {
                "deep": {"minutes": 80, "count": 4},
                "light": {"minutes": 229, "count": 27},
                "rem": {"minutes": 111, "count": 8},
                "wake": {"minutes": 52, "count": 24}
            },
            "data": data,
            "shortData": short_data
        }
    }))
    .expect("Failed to build record")
}

fn benchmark_flatten(c: &mut Criterion) {
    let record = realistic_record();

    let mut group = c.benchmark_group("flatten");

    group.bench_function("full_night_record", |b| {
        b.iter(|| flatten(black_box("Y001"), black_box(&record)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_flatten);
criterion_main!(benches);
