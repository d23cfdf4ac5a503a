// src/orchestrator.rs

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crossbeam::channel;

use crate::{
    adapters::Adapters,
    errors::{BatchReport, FailureRecord},
    tweaks::{Batch, BatchItem, Step, StepOutcome},
};

/// Append-only consumer of human-readable progress lines. Each `emit` call
/// delivers exactly one complete line; the orchestrator serializes calls
/// across concurrent workers, so implementors never see interleaved text.
pub trait ProgressSink: Send {
    fn emit(&mut self, line: &str);
}

/// Plain callbacks are sinks, mirroring the way a GUI hands in a closure.
impl<F: FnMut(&str) + Send> ProgressSink for F {
    fn emit(&mut self, line: &str) {
        self(line)
    }
}

/// Cooperative cancellation flag. Polled between steps and between
/// parallel-group partitions only; a step already dispatched to an adapter
/// runs to completion.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Serializes sink access: the single writer lock all workers share, so no
/// two progress lines can interleave mid-line.
struct Reporter<'a> {
    sink: Mutex<&'a mut dyn ProgressSink>,
}

impl Reporter<'_> {
    fn emit(&self, line: &str) {
        if let Ok(mut sink) = self.sink.lock() {
            sink.emit(line);
        }
    }
}

/// Executes batches against a set of capability adapters.
///
/// Sequential items run on the calling thread in declared order. A parallel
/// group is split into roughly-equal contiguous partitions, one per worker,
/// and acts as a barrier: the next sequential item starts only after every
/// partition has finished. A failing step never aborts the batch; failures
/// accumulate and are returned to the caller at the end.
pub struct Orchestrator {
    parallelism: usize,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Worker pool bounded by the host's available parallelism.
    pub fn new() -> Self {
        Self {
            parallelism: num_cpus::get(),
        }
    }

    /// Overrides the worker pool size, clamped to at least one worker.
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    pub fn execute(
        &self,
        batch: &Batch,
        adapters: &Adapters<'_>,
        sink: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> BatchReport {
        let reporter = Reporter {
            sink: Mutex::new(sink),
        };
        let mut failures = Vec::new();
        tracing::debug!("Executing batch '{}'.", batch.title());

        let cancelled = self.run_batch(batch, "", adapters, &reporter, cancel, &mut failures);

        tracing::debug!(
            "Batch '{}' {} with {} recorded failure(s).",
            batch.title(),
            if cancelled { "cancelled" } else { "completed" },
            failures.len()
        );
        BatchReport {
            failures,
            cancelled,
        }
    }

    /// Walks one batch level. Returns true if cancellation cut the run short.
    fn run_batch(
        &self,
        batch: &Batch,
        prefix: &str,
        adapters: &Adapters<'_>,
        reporter: &Reporter<'_>,
        cancel: &CancelToken,
        failures: &mut Vec<FailureRecord>,
    ) -> bool {
        for item in batch.items() {
            if cancel.is_cancelled() {
                return true;
            }
            match item {
                BatchItem::Step(step) => {
                    if let Some(failure) = run_step(step, prefix, adapters, reporter) {
                        failures.push(failure);
                    }
                }
                BatchItem::Nested(sub) => {
                    // Sub-batch failures flatten into the parent list with
                    // the sub-batch title as a name prefix.
                    let sub_prefix = format!("{}{}: ", prefix, sub.title());
                    if self.run_batch(sub, &sub_prefix, adapters, reporter, cancel, failures) {
                        return true;
                    }
                }
                BatchItem::Group(steps) => {
                    if self.run_group(steps, prefix, adapters, reporter, cancel, failures) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn run_group(
        &self,
        steps: &[Step],
        prefix: &str,
        adapters: &Adapters<'_>,
        reporter: &Reporter<'_>,
        cancel: &CancelToken,
        failures: &mut Vec<FailureRecord>,
    ) -> bool {
        let workers = self.parallelism.min(steps.len());
        if workers <= 1 {
            for step in steps {
                if cancel.is_cancelled() {
                    return true;
                }
                if let Some(failure) = run_step(step, prefix, adapters, reporter) {
                    failures.push(failure);
                }
            }
            return cancel.is_cancelled();
        }

        // Roughly-equal contiguous partitions, one worker each. Relative
        // order holds within a partition but not across partitions.
        let partition_len = steps.len().div_ceil(workers);
        let (failure_tx, failure_rx) = channel::unbounded::<FailureRecord>();

        std::thread::scope(|scope| {
            for partition in steps.chunks(partition_len) {
                let failure_tx = failure_tx.clone();
                scope.spawn(move || {
                    for step in partition {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if let Some(failure) = run_step(step, prefix, adapters, reporter) {
                            let _ = failure_tx.send(failure);
                        }
                    }
                });
            }
        });
        // The scope join above is the group's barrier.

        drop(failure_tx);
        failures.extend(failure_rx.iter());
        cancel.is_cancelled()
    }
}

/// Emits exactly one progress line, then attempts the mutation. A tolerated
/// skip is not a failure; everything else failing becomes a record that the
/// batch carries to the end of the run.
fn run_step(
    step: &Step,
    prefix: &str,
    adapters: &Adapters<'_>,
    reporter: &Reporter<'_>,
) -> Option<FailureRecord> {
    reporter.emit(step.name());
    match step.execute(adapters) {
        Ok(StepOutcome::Applied) => None,
        Ok(StepOutcome::Skipped) => {
            tracing::debug!("Step '{}' skipped: target not present.", step.name());
            None
        }
        Err(error) => {
            tracing::error!("Step '{}' failed: {:#}", step.name(), error);
            Some(FailureRecord {
                step: format!("{}{}", prefix, step.name()),
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::adapters::{mock::MockSystem, RegistryValue};
    use crate::tweaks::Step;

    const TEST_PATH: &str = "HKEY_CURRENT_USER\\SOFTWARE\\DebloatTest";

    fn write_step(n: u32) -> Step {
        Step::registry_dword(format!("Writing value {}.", n), TEST_PATH, format!("Value{}", n), n)
    }

    fn missing_task_step(label: &str) -> Step {
        Step::task_disable(label.to_string(), format!("\\Missing\\{}", label))
    }

    /// Discards progress output.
    fn quiet() -> impl FnMut(&str) + Send {
        |_: &str| {}
    }

    #[test]
    fn failing_step_does_not_stop_the_batch() {
        let system = MockSystem::new();
        let batch = Batch::new("Mixed")
            .step(missing_task_step("A"))
            .step(write_step(1))
            .step(missing_task_step("C"));

        let mut sink = quiet();
        let report = Orchestrator::with_parallelism(1).execute(
            &batch,
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert!(!report.cancelled);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].step, "A");
        assert_eq!(report.failures[1].step, "C");
        // B's mutation landed even though A failed first.
        assert_eq!(
            system.registry_value(TEST_PATH, "Value1"),
            Some(RegistryValue::Dword(1))
        );
    }

    #[test]
    fn nested_failures_are_prefixed_with_the_sub_batch_title() {
        let system = MockSystem::new();
        let batch = Batch::new("Parent")
            .nested(Batch::new("Telemetry Tasks").step(missing_task_step("X")));

        let mut sink = quiet();
        let report = Orchestrator::new().execute(
            &batch,
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, "Telemetry Tasks: X");
    }

    #[test]
    fn parallel_group_final_state_is_pool_size_independent() {
        let steps: Vec<Step> = (0..8).map(write_step).collect();

        let single = MockSystem::new();
        let pooled = MockSystem::new();
        let batch = Batch::new("Bulk").parallel(steps);

        for (system, workers) in [(&single, 1), (&pooled, 4)] {
            let mut sink = quiet();
            let report = Orchestrator::with_parallelism(workers).execute(
                &batch,
                &system.adapters(),
                &mut sink,
                &CancelToken::new(),
            );
            assert!(report.success());
        }
        assert_eq!(single.state(), pooled.state());
    }

    #[test]
    fn progress_lines_are_line_atomic_under_concurrent_workers() {
        let steps: Vec<Step> = (0..8).map(write_step).collect();
        let expected: BTreeSet<String> = steps.iter().map(|s| s.name().to_string()).collect();
        let batch = Batch::new("Bulk").parallel(steps);
        let system = MockSystem::new();

        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report = Orchestrator::with_parallelism(4).execute(
            &batch,
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert!(report.success());
        assert_eq!(lines.len(), 8);
        // Every observed line is one complete step name; no partial or
        // interleaved writes, no duplicates.
        let observed: BTreeSet<String> = lines.iter().cloned().collect();
        assert_eq!(observed, expected);
    }

    #[test]
    fn parallel_group_is_a_barrier_before_following_steps() {
        let group: Vec<Step> = (0..4).map(write_step).collect();
        let group_names: BTreeSet<String> =
            group.iter().map(|s| s.name().to_string()).collect();
        let batch = Batch::new("Barrier")
            .parallel(group)
            .step(write_step(99));
        let system = MockSystem::new();

        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        Orchestrator::with_parallelism(2).execute(
            &batch,
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "Writing value 99.");
        let first_four: BTreeSet<String> = lines[..4].iter().cloned().collect();
        assert_eq!(first_four, group_names);
    }

    #[test]
    fn cancelled_token_prevents_any_step_from_running() {
        let system = MockSystem::new();
        let batch = Batch::new("Never").step(write_step(1));
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report =
            Orchestrator::new().execute(&batch, &system.adapters(), &mut sink, &cancel);

        assert!(report.cancelled);
        assert!(report.failures.is_empty());
        assert!(lines.is_empty());
        assert!(system.registry.lock().unwrap().is_empty());
    }

    #[test]
    fn mid_run_cancellation_omits_remaining_steps() {
        let system = MockSystem::new();
        let cancel = CancelToken::new();
        let trip = cancel.clone();
        let batch = Batch::new("Cut Short")
            .step(write_step(1))
            .step(Step::raw("Requesting cancellation.", move || {
                trip.cancel();
                Ok(())
            }))
            .step(write_step(3));

        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report =
            Orchestrator::new().execute(&batch, &system.adapters(), &mut sink, &cancel);

        assert!(report.cancelled);
        // The not-yet-started step is omitted entirely: no progress line, no
        // mutation, no failure record.
        assert!(report.failures.is_empty());
        assert_eq!(lines.len(), 2);
        assert_eq!(system.registry_value(TEST_PATH, "Value3"), None);
    }

    #[test]
    fn closure_sinks_receive_the_progress_stream() {
        let system = MockSystem::new();
        let batch = Batch::new("Logged").step(write_step(1));

        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report = Orchestrator::new().execute(
            &batch,
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );

        assert!(report.success());
        assert_eq!(lines, vec!["Writing value 1.".to_string()]);
    }

    #[test]
    fn empty_batch_reports_success() {
        let system = MockSystem::new();
        let mut lines: Vec<String> = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        let report = Orchestrator::new().execute(
            &Batch::new("Empty"),
            &system.adapters(),
            &mut sink,
            &CancelToken::new(),
        );
        assert!(report.success());
        assert!(lines.is_empty());
    }
}
