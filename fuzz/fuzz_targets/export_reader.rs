#![no_main]

use headcount::ingest::{read_records, IngestOptions};
use headcount::interval::extract_intervals;
use headcount::occupancy::count_occupancy;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Arbitrary export bytes must produce records or an error, never a panic
    let options = IngestOptions::default();
    if let Ok(records) = read_records(data, Path::new("fuzz.csv"), &options) {
        if let Ok(intervals) = extract_intervals(&records) {
            let _ = count_occupancy("fuzz", &intervals);
        }
    }
});
