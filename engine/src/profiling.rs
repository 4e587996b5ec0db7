use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTimings {
    pub step: Duration,
    pub record: Duration,
    pub total: Duration,
}

/// Hook for capturing per-step timings from a `HeadlessRunner`.
pub trait Profiler {
    fn on_step(&mut self, _frame: usize, _timings: StepTimings) {}
}

/// Emits a `tracing` warning for every step slower than `budget`.
#[derive(Debug, Clone, Copy)]
pub struct TracingProfiler {
    budget: Duration,
    slow_steps: usize,
}

impl TracingProfiler {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            slow_steps: 0,
        }
    }

    pub fn slow_steps(&self) -> usize {
        self.slow_steps
    }
}

impl Profiler for TracingProfiler {
    fn on_step(&mut self, frame: usize, timings: StepTimings) {
        if timings.total <= self.budget {
            tracing::trace!(frame, total_us = timings.total.as_micros() as u64, "step");
            return;
        }
        self.slow_steps += 1;
        tracing::warn!(
            frame,
            step_us = timings.step.as_micros() as u64,
            record_us = timings.record.as_micros() as u64,
            budget_us = self.budget.as_micros() as u64,
            "step exceeded budget"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_profiler_counts_only_steps_over_budget() {
        let mut p = TracingProfiler::new(Duration::from_millis(5));
        p.on_step(
            1,
            StepTimings {
                total: Duration::from_millis(1),
                ..StepTimings::default()
            },
        );
        p.on_step(
            2,
            StepTimings {
                total: Duration::from_millis(9),
                ..StepTimings::default()
            },
        );
        assert_eq!(p.slow_steps(), 1);
    }
}
