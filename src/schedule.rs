use std::time::{Duration, Instant};

/// A continuation waiting for its moment.
#[derive(Debug, Clone)]
struct Pending<T> {
    due: Instant,
    generation: u64,
    task: T,
}

/// Timed continuations tagged with the generation that scheduled them.
///
/// Bumping the generation with [`Scheduler::invalidate`] makes everything
/// scheduled earlier stale; stale entries are dropped instead of fired.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    generation: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            generation: 0,
            pending: Vec::new(),
        }
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        let current = self.generation;
        self.pending.retain(|p| p.generation == current);
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) {
        self.pending.push(Pending {
            due: now + delay,
            generation: self.generation,
            task,
        });
    }

    /// Earliest deadline among live continuations.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending
            .iter()
            .filter(|p| p.generation == self.generation)
            .map(|p| p.due)
            .min()
    }

    /// Remove and return the earliest continuation due at `now`, if any.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let current = self.generation;
        self.pending.retain(|p| p.generation == current);

        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| p.due)?;
        Some(self.pending.remove(idx).task)
    }
}
