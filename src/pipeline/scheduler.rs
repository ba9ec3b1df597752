use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};

use crate::config::ThreadingOpts;
use crate::decode::source::FrameSource;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameRgb, FrameSeq};
use crate::foundation::error::{ReliefError, ReliefResult};
use crate::pipeline::cancel::CancelToken;
use crate::render::ReliefRenderer;

/// Per-frame work run by pipeline workers.
///
/// Implementations are shared by every worker thread and must not rely on call order.
pub trait FrameProcessor: Sync {
    /// Output frame size for inputs of `width x height`.
    fn output_size(&self, width: u32, height: u32) -> ReliefResult<(u32, u32)>;

    fn process(&self, seq: FrameSeq, frame: &FrameRgb) -> ReliefResult<FrameRgb>;
}

impl FrameProcessor for ReliefRenderer {
    fn output_size(&self, width: u32, height: u32) -> ReliefResult<(u32, u32)> {
        ReliefRenderer::output_size(self, width, height)
    }

    fn process(&self, _seq: FrameSeq, frame: &FrameRgb) -> ReliefResult<FrameRgb> {
        self.render(frame)
    }
}

/// Lifecycle of one [`run_pipeline`] call.
///
/// Frames reach the sink as soon as they can be written in order, so emission overlaps
/// `Dispatching` and `Draining`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Pulling frames from the source into the work queue.
    Dispatching,
    /// Queue closed; workers are finishing the items already in it.
    Draining,
    /// Every worker has finished; the outcome of the run is being settled.
    Reassembling,
    Done,
}

/// Counters reported by a finished (or cancelled) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub workers: usize,
    /// Frames pulled from the source and enqueued.
    pub frames_read: u64,
    pub frames_rendered: u64,
    /// Frames drained without rendering because cancellation was observed.
    pub frames_skipped: u64,
    /// Frames pushed to the sink.
    pub frames_emitted: u64,
    /// Largest number of rendered frames held back waiting for an earlier frame.
    pub peak_buffered: usize,
    pub cancelled: bool,
}

type WorkItem = (FrameSeq, FrameRgb);

enum Outcome {
    Rendered(FrameRgb),
    Failed(ReliefError),
    Skipped,
}

type Completed = (FrameSeq, Outcome);

struct DispatchOutcome {
    read: u64,
    cancelled: bool,
}

/// Render every frame of `source` with `processor` on a worker pool and push the results to
/// `sink` in input order.
///
/// The sink is started before any thread is spawned, so an unusable sink fails the run up front.
/// Frames are written while the source is still being read; at most
/// [`ThreadingOpts::in_flight_limit`] frames are held at any time. On cancellation the run still
/// finalizes the sink with the gap-free prefix `1..=k` of frames that completed. A failing frame
/// aborts the run with [`ReliefError::FrameFailed`]; the sink is not finalized in that case.
pub fn run_pipeline(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    processor: &dyn FrameProcessor,
    threading: &ThreadingOpts,
    cancel: &CancelToken,
) -> ReliefResult<RunStats> {
    if threading.workers == Some(0) {
        return Err(ReliefError::validation(
            "threading.workers must be >= 1 when set",
        ));
    }

    let mut state = PipelineState::Idle;
    let info = source.info();
    let (out_w, out_h) = processor.output_size(info.width, info.height)?;
    sink.begin(SinkConfig {
        width: out_w,
        height: out_h,
        fps: info.fps,
    })?;

    let workers = threading.worker_count();
    let capacity = threading.queue_capacity_for(workers);
    let limit = threading.in_flight_limit(workers);
    tracing::info!(
        workers,
        queue_capacity = capacity,
        in_flight_limit = limit,
        in_width = info.width,
        in_height = info.height,
        out_width = out_w,
        out_height = out_h,
        "pipeline starting"
    );

    let abort = AtomicBool::new(false);
    let (work_tx, work_rx) = crossbeam_channel::bounded::<WorkItem>(capacity);
    let (done_tx, done_rx) = crossbeam_channel::unbounded::<Completed>();
    // One token per outstanding frame; the dispatcher blocks while all `limit` are taken.
    let (slot_tx, slot_rx) = crossbeam_channel::bounded::<()>(limit);
    let mut reorder = Reorder::new(sink, slot_rx);

    enter(&mut state, PipelineState::Dispatching);
    let (dispatched, panicked_worker) = std::thread::scope(|scope| {
        let abort = &abort;
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || worker_loop(id, processor, work_rx, done_tx, cancel, abort))
            })
            .collect();
        drop(work_rx);
        drop(done_tx);

        let dispatcher = scope.spawn(move || {
            let outcome = dispatch(source, work_tx, slot_tx, cancel, abort);
            if outcome.is_err() {
                abort.store(true, Ordering::Release);
            }
            log_transition(PipelineState::Dispatching, PipelineState::Draining);
            outcome
        });

        for (seq, outcome) in done_rx.iter() {
            reorder.accept(seq, outcome, abort);
        }

        let dispatched = dispatcher.join().unwrap_or_else(|_| {
            Err(ReliefError::Other(anyhow::anyhow!(
                "pipeline dispatcher panicked"
            )))
        });
        let panicked_worker = handles
            .into_iter()
            .enumerate()
            .filter_map(|(id, h)| h.join().is_err().then_some(id))
            .next();
        (dispatched, panicked_worker)
    });
    // `Draining` was entered on the dispatcher thread.
    state = PipelineState::Draining;
    enter(&mut state, PipelineState::Reassembling);

    let Reorder {
        sink,
        pending,
        failure,
        sink_error,
        rendered,
        skipped,
        emitted,
        peak,
        ..
    } = reorder;

    if let Some(id) = panicked_worker {
        return Err(ReliefError::Other(anyhow::anyhow!(
            "pipeline worker {id} panicked"
        )));
    }
    if let Some((seq, e)) = failure {
        tracing::error!(%seq, error = %e, "frame failed, aborting run");
        return Err(ReliefError::frame_failed(seq, e));
    }
    let dispatched = dispatched?;
    if let Some(e) = sink_error {
        return Err(e);
    }

    // Cancellation may land after the source is exhausted, while workers are still draining.
    let cancelled = dispatched.cancelled || skipped > 0 || cancel.is_cancelled();
    if !cancelled && (emitted != dispatched.read || !pending.is_empty()) {
        return Err(ReliefError::Other(anyhow::anyhow!(
            "internal error: {emitted} of {} frames written",
            dispatched.read
        )));
    }
    if cancelled && rendered > emitted {
        tracing::warn!(
            kept = emitted,
            dropped = rendered - emitted,
            "dropping frames after the first gap in a cancelled run"
        );
    }

    sink.end()?;
    enter(&mut state, PipelineState::Done);

    let stats = RunStats {
        workers,
        frames_read: dispatched.read,
        frames_rendered: rendered,
        frames_skipped: skipped,
        frames_emitted: emitted,
        peak_buffered: peak,
        cancelled,
    };
    tracing::info!(
        frames_read = stats.frames_read,
        frames_emitted = stats.frames_emitted,
        frames_skipped = stats.frames_skipped,
        peak_buffered = stats.peak_buffered,
        cancelled = stats.cancelled,
        "pipeline finished"
    );
    Ok(stats)
}

fn enter(state: &mut PipelineState, next: PipelineState) {
    log_transition(*state, next);
    *state = next;
}

fn log_transition(from: PipelineState, to: PipelineState) {
    tracing::debug!(?from, ?to, "pipeline state");
}

fn dispatch(
    source: &mut dyn FrameSource,
    work_tx: Sender<WorkItem>,
    slots: Sender<()>,
    cancel: &CancelToken,
    abort: &AtomicBool,
) -> ReliefResult<DispatchOutcome> {
    let info = source.info();
    let mut seq = FrameSeq::FIRST;
    let mut read = 0u64;
    let cancelled = |read| {
        tracing::warn!(dispatched = read, "cancellation observed, stopping dispatch");
        Ok(DispatchOutcome {
            read,
            cancelled: true,
        })
    };
    loop {
        // Blocks while the in-flight limit is reached.
        if slots.send(()).is_err() {
            break;
        }
        if cancel.is_cancelled() {
            return cancelled(read);
        }
        if abort.load(Ordering::Acquire) {
            break;
        }

        let Some(frame) = source.next_frame()? else {
            break;
        };
        // A frame read after cancellation was requested is not dispatched.
        if cancel.is_cancelled() {
            return cancelled(read);
        }
        if frame.width != info.width || frame.height != info.height {
            return Err(ReliefError::validation(format!(
                "source frame {seq} is {}x{}, stream declared {}x{}",
                frame.width, frame.height, info.width, info.height
            )));
        }

        if work_tx.send((seq, frame)).is_err() {
            break;
        }
        read += 1;
        seq = seq.next();
    }
    Ok(DispatchOutcome {
        read,
        cancelled: false,
    })
}

fn worker_loop(
    id: usize,
    processor: &dyn FrameProcessor,
    work_rx: Receiver<WorkItem>,
    done_tx: Sender<Completed>,
    cancel: &CancelToken,
    abort: &AtomicBool,
) {
    for (seq, frame) in work_rx.iter() {
        let outcome = if cancel.is_cancelled() || abort.load(Ordering::Acquire) {
            Outcome::Skipped
        } else {
            match process_guarded(processor, seq, &frame) {
                Ok(out) => Outcome::Rendered(out),
                Err(e) => {
                    abort.store(true, Ordering::Release);
                    Outcome::Failed(e)
                }
            }
        };
        drop(frame);
        tracing::trace!(
            worker = id,
            %seq,
            rendered = matches!(outcome, Outcome::Rendered(_)),
            "work item done"
        );
        if done_tx.send((seq, outcome)).is_err() {
            break;
        }
    }
}

/// A panicking processor becomes a failed frame instead of a frame that never reports back.
fn process_guarded(
    processor: &dyn FrameProcessor,
    seq: FrameSeq,
    frame: &FrameRgb,
) -> ReliefResult<FrameRgb> {
    std::panic::catch_unwind(AssertUnwindSafe(|| processor.process(seq, frame))).unwrap_or_else(
        |_| {
            Err(ReliefError::Other(anyhow::anyhow!(
                "frame processor panicked"
            )))
        },
    )
}

/// Reorder buffer between the workers and the sink.
///
/// Every dispatched frame reports back exactly once and gives its in-flight token back exactly
/// once: when it is written, or when it is discarded.
struct Reorder<'a> {
    sink: &'a mut dyn FrameSink,
    slots: Receiver<()>,
    pending: BTreeMap<FrameSeq, FrameRgb>,
    next: FrameSeq,
    /// Lowest skipped sequence number; nothing at or after it is written.
    stop_at: Option<FrameSeq>,
    /// Source or sink trouble elsewhere in the run.
    aborted: bool,
    failure: Option<(FrameSeq, ReliefError)>,
    sink_error: Option<ReliefError>,
    rendered: u64,
    skipped: u64,
    emitted: u64,
    peak: usize,
}

impl<'a> Reorder<'a> {
    fn new(sink: &'a mut dyn FrameSink, slots: Receiver<()>) -> Self {
        Self {
            sink,
            slots,
            pending: BTreeMap::new(),
            next: FrameSeq::FIRST,
            stop_at: None,
            aborted: false,
            failure: None,
            sink_error: None,
            rendered: 0,
            skipped: 0,
            emitted: 0,
            peak: 0,
        }
    }

    fn halted(&self) -> bool {
        self.aborted || self.failure.is_some() || self.sink_error.is_some()
    }

    fn release(&self, n: usize) {
        for _ in 0..n {
            let _ = self.slots.try_recv();
        }
    }

    fn accept(&mut self, seq: FrameSeq, outcome: Outcome, abort: &AtomicBool) {
        self.aborted |= abort.load(Ordering::Acquire);
        match outcome {
            Outcome::Rendered(frame) => {
                self.rendered += 1;
                if self.halted() || self.stop_at.is_some_and(|stop| seq >= stop) {
                    self.release(1);
                } else {
                    self.pending.insert(seq, frame);
                    self.peak = self.peak.max(self.pending.len());
                }
            }
            Outcome::Failed(e) => {
                if self.failure.as_ref().is_none_or(|(first, _)| seq < *first) {
                    self.failure = Some((seq, e));
                }
                self.release(1);
            }
            Outcome::Skipped => {
                self.skipped += 1;
                self.stop_at = Some(self.stop_at.map_or(seq, |stop| stop.min(seq)));
                self.release(1);
            }
        }

        if self.halted() {
            self.discard_pending();
            return;
        }
        if let Some(stop) = self.stop_at {
            let unreachable = self.pending.split_off(&stop);
            self.release(unreachable.len());
        }
        self.flush(abort);
    }

    fn flush(&mut self, abort: &AtomicBool) {
        while let Some(frame) = self.pending.remove(&self.next) {
            let seq = self.next;
            let pushed = self.sink.push_frame(seq, &frame);
            drop(frame);
            self.release(1);
            if let Err(e) = pushed {
                tracing::error!(%seq, error = %e, "sink rejected frame, aborting run");
                abort.store(true, Ordering::Release);
                self.sink_error = Some(e);
                self.discard_pending();
                return;
            }
            self.emitted += 1;
            self.next = seq.next();
        }
    }

    fn discard_pending(&mut self) {
        let n = self.pending.len();
        self.pending.clear();
        self.release(n);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/scheduler.rs"]
mod tests;
