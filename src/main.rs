//! # PID Loop Simulator Entry Point
//!
//! Wires the two execution contexts together the way the original two-core
//! firmware split them:
//! - **Engine thread** — periodic real-time tick loop (default 10 ms,
//!   operator-adjustable 1–1000 ms), pinned to its own core and spawned at
//!   max priority so the control plane cannot starve it.
//! - **Control plane** — blocking HTTP listener on the main thread serving
//!   the console page, JSON snapshots and configuration writes.
//!
//! Telemetry of every tick is traced to `data/logs/sim_trace.csv` through a
//! lock-free queue; the engine never blocks on the exporter.

use std::{
    fs::create_dir_all,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use log::{error, info};
use thread_priority::{ThreadBuilderExt, ThreadPriority};

use pidsim::{
    engine::{sim::SimEngine, state::SharedControlState},
    server,
    trace::TraceRecorder,
};

const HTTP_ADDR: &str = "127.0.0.1:8080";
const TRACE_CSV: &str = "data/logs/sim_trace.csv";
/// Core the engine thread is pinned to (core 1 on the original hardware).
const ENGINE_CORE: usize = 1;

fn main() {
    env_logger::init();
    info!("=== PID LOOP SIMULATOR START ===");
    println!("Control console live at: http://{}", HTTP_ADDR);

    create_dir_all("data/logs").ok();

    let state = Arc::new(SharedControlState::new());
    let trace = Arc::new(TraceRecorder::new());
    let _exporter = trace.start_exporter(TRACE_CSV.into());

    let running = Arc::new(AtomicBool::new(true));
    let engine_handle = spawn_engine(state.clone(), trace.clone(), running.clone());

    // Blocks for the process lifetime; the engine ticks regardless of
    // whether anyone is connected.
    server::run(HTTP_ADDR, state, running.clone());

    // Only reached if the listener dies; bring the engine down cleanly.
    running.store(false, Ordering::Release);
    let _ = engine_handle.join();
    info!("=== PID LOOP SIMULATOR FINISHED ===");
}

/// Spawn the engine loop on its own max-priority thread, pinned to
/// `ENGINE_CORE` so tick jitter stays bounded under control-plane load.
fn spawn_engine(
    state: Arc<SharedControlState>,
    trace: Arc<TraceRecorder>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("sim-engine".into())
        .spawn_with_priority(ThreadPriority::Max, move |_| {
            let core_ids = core_affinity::get_core_ids().unwrap_or_default();
            match core_ids.get(ENGINE_CORE).or_else(|| core_ids.first()) {
                Some(core_id) => {
                    if core_affinity::set_for_current(*core_id) {
                        info!("engine pinned to core {:?}", core_id);
                    } else {
                        error!("failed to pin engine to core {:?}", core_id);
                    }
                }
                None => error!("no cores reported; engine unpinned"),
            }

            let mut engine = SimEngine::new(state, Some(trace));
            engine.run(running);
        })
        .expect("failed to spawn engine thread")
}
