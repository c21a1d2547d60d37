use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Wall-clock time spent in each pipeline stage, in execution order.
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    stages: Vec<StageTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timer: Timer) {
        let (name, duration) = timer.stop();
        self.stages.push(StageTiming { name, duration });
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    pub fn get_stage(&self, name: &str) -> Option<Duration> {
        self.stages
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.duration)
            .reduce(|a, b| a + b)
    }

    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }
}

impl fmt::Display for PipelineTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_duration().as_secs_f64();
        writeln!(f, "{:-<50}", "")?;
        for stage in &self.stages {
            let ms = stage.duration.as_secs_f64() * 1000.0;
            let share = if total > 0.0 {
                stage.duration.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            writeln!(f, "{:<20} {:>12.3}ms ({:>5.1}%)", stage.name, ms, share)?;
        }
        writeln!(f, "{:-<50}", "")?;
        write!(f, "{:<20} {:>12.3}ms", "total", total * 1000.0)
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
