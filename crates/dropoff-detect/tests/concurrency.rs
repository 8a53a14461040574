// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dropoff_core::{BreakpointResult, DetectorConfig};
use dropoff_detect::BreakpointDetector;
use std::sync::Arc;
use std::thread;

fn assert_send_sync<T: Send + Sync>() {}

fn segment_curve(segment: usize) -> Vec<(u32, f64)> {
    (0..=10u32)
        .map(|step| {
            let x = f64::from(step);
            let wobble = ((segment as f64) + x).sin() * 3.0;
            (step * 10, 40.0 - 2.5 * x + 0.4 * x * x + wobble)
        })
        .collect()
}

#[test]
fn public_types_are_thread_safe() {
    assert_send_sync::<BreakpointDetector>();
    assert_send_sync::<BreakpointResult>();
    assert_send_sync::<DetectorConfig>();
}

#[test]
fn shared_detector_matches_sequential_results_across_threads() {
    const THREADS: usize = 8;
    const SEGMENTS_PER_THREAD: usize = 32;

    let detector = Arc::new(BreakpointDetector::new(DetectorConfig::default()).expect("valid"));
    let sequential: Vec<BreakpointResult> = (0..THREADS * SEGMENTS_PER_THREAD)
        .map(|segment| detector.detect(segment_curve(segment)))
        .collect();

    let mut workers = Vec::with_capacity(THREADS);
    for worker_idx in 0..THREADS {
        let detector = Arc::clone(&detector);
        workers.push(thread::spawn(move || {
            (0..SEGMENTS_PER_THREAD)
                .map(|offset| {
                    let segment = worker_idx * SEGMENTS_PER_THREAD + offset;
                    (segment, detector.detect(segment_curve(segment)))
                })
                .collect::<Vec<_>>()
        }));
    }

    for worker in workers {
        for (segment, result) in worker.join().expect("worker should join cleanly") {
            assert_eq!(result, sequential[segment], "segment {segment} diverged");
        }
    }
}
