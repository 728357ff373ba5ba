//! Per-tick telemetry tracing: lock-free queue drained by a background CSV
//! exporter.
//!
//! The engine pushes one row per tick and never blocks; rows are silently
//! dropped when the queue is full. The exporter thread batches writes and
//! flushes periodically so disk latency never feeds back into the tick loop.

use std::{
    fs::File,
    io::BufWriter,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_queue::ArrayQueue;
use csv::Writer;
use log::{debug, error};
use serde::Serialize;

const TRACE_QUEUE_CAPACITY: usize = 16_384;
const EXPORT_POLL_MS: u64 = 10;
const FLUSH_BATCHES: usize = 8;

/// One tick of loop telemetry as written to the trace CSV.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TickTrace {
    pub seq: u64,
    pub time_s: f64,
    pub setpoint: f64,
    pub control: f64,
    pub actuator: f64,
    pub output: f64,
}

/// Non-blocking trace recorder shared between the engine (producer) and the
/// exporter thread (consumer).
pub struct TraceRecorder {
    queue: Arc<ArrayQueue<TickTrace>>,
    seq: AtomicU64,
    dropped: AtomicU64,
    stopped: Arc<AtomicBool>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(ArrayQueue::new(TRACE_QUEUE_CAPACITY)),
            seq: AtomicU64::new(1),
            dropped: AtomicU64::new(0),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Append one tick row. Lock-free; drops the row when the queue is full
    /// so the engine never waits on the exporter.
    pub fn record(&self, time_s: f64, setpoint: f64, control: f64, actuator: f64, output: f64) {
        let row = TickTrace {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            time_s,
            setpoint,
            control,
            actuator,
            output,
        };
        if self.queue.push(row).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Rows lost to a full queue so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Ask the exporter to drain the queue and exit. The production binary
    /// never stops tracing; tests use this to join the exporter.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Spawn the background exporter draining the queue into a CSV file.
    /// Exits once [`stop`] has been called and the queue is empty.
    ///
    /// [`stop`]: TraceRecorder::stop
    pub fn start_exporter(&self, output_csv: PathBuf) -> JoinHandle<()> {
        let queue = self.queue.clone();
        let stopped = self.stopped.clone();

        thread::spawn(move || {
            let file = match File::create(&output_csv) {
                Ok(f) => f,
                Err(e) => {
                    error!("failed to create trace csv {:?}: {}", output_csv, e);
                    return;
                }
            };
            let mut wtr = Writer::from_writer(BufWriter::new(file));
            let mut flush_counter = 0usize;

            loop {
                let mut any = false;
                // Batch dequeue: up to 256 rows per poll.
                for _ in 0..256 {
                    match queue.pop() {
                        Some(row) => {
                            any = true;
                            wtr.serialize(row).ok();
                        }
                        None => break,
                    }
                }

                if any {
                    flush_counter += 1;
                    if flush_counter >= FLUSH_BATCHES {
                        wtr.flush().ok();
                        flush_counter = 0;
                    }
                } else if stopped.load(Ordering::SeqCst) && queue.is_empty() {
                    break;
                } else {
                    thread::sleep(Duration::from_millis(EXPORT_POLL_MS));
                }
            }

            wtr.flush().ok();
            debug!("trace exporter exiting");
        })
    }
}

impl Default for TraceRecorder {
    fn default() -> Self {
        Self::new()
    }
}
