use std::time::Instant;

use crate::session::{Session, StepStatus};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks: u64,
    pub steps: u64,
    pub terminal: u64,
    pub would_block: u64,
    pub awaiting_human: u64,
    pub cancelled: u64,
    pub errors: u64,
}

/// Round-robin driver for many sessions on one thread.
pub struct Scheduler {
    sessions: Vec<Session>,
    steps_per_tick: u32,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new(sessions: Vec<Session>, steps_per_tick: u32) -> Self {
        Self {
            sessions,
            steps_per_tick: steps_per_tick.max(1),
            stats: SchedulerStats::default(),
        }
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut [Session] {
        &mut self.sessions
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions
    }

    /// True once no session can make further progress on its own.
    pub fn all_done(&self) -> bool {
        self.sessions
            .iter()
            .all(|s| s.is_over() || s.is_cancelled())
    }

    /// Run one scheduler tick: round-robin over all sessions, giving each up to `steps_per_tick`.
    ///
    /// A session that errors is cancelled so it cannot stall the batch.
    pub fn tick(&mut self, now: Instant) {
        self.stats.ticks += 1;
        for s in &mut self.sessions {
            for _ in 0..self.steps_per_tick {
                match s.step(now) {
                    Ok(r) => match r.status {
                        StepStatus::Progress => {
                            self.stats.steps += 1;
                            continue;
                        }
                        StepStatus::WouldBlock => self.stats.would_block += 1,
                        StepStatus::AwaitingHuman => self.stats.awaiting_human += 1,
                        StepStatus::Terminal => self.stats.terminal += 1,
                        StepStatus::Cancelled => self.stats.cancelled += 1,
                    },
                    Err(_) => {
                        self.stats.errors += 1;
                        s.cancel();
                    }
                }
                break;
            }
        }
    }

    /// Tick on a virtual clock until every session is over, cancelled, or
    /// waiting on a human. Returns the number of ticks run.
    pub fn run_to_completion(&mut self) -> u64 {
        let mut clock = Instant::now();
        let start = self.stats.ticks;
        while !self.all_done() {
            self.tick(clock);
            let automated: Vec<&Session> = self
                .sessions
                .iter()
                .filter(|s| !s.is_over() && !s.is_cancelled())
                .filter(|s| s.controller().current_player().kind.is_automated())
                .collect();
            if automated.is_empty() {
                break;
            }
            let ready = automated
                .iter()
                .any(|s| s.next_due().map_or(true, |due| due <= clock));
            if !ready {
                if let Some(due) = automated.iter().filter_map(|s| s.next_due()).min() {
                    clock = clock.max(due);
                }
            }
        }
        self.stats.ticks - start
    }
}
