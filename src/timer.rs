//! One-shot scheduling and self-rescheduling loops.
//!
//! Everything here is single-threaded: the browser scheduler runs tasks on the
//! page's event loop, so shared state is `Rc`/`Cell` rather than atomics.

use std::{cell::Cell, rc::Rc, time::Duration};

pub trait Scheduler {
    /// Runs `task` once after `delay`.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Runs `step` after `delay`, then again after whatever delay it returns, until it
/// returns `None` or `token` is cancelled. The token is checked before each step and
/// before each reschedule.
pub fn run_loop<F>(scheduler: Rc<dyn Scheduler>, delay: Duration, token: CancellationToken, step: F)
where
    F: FnMut() -> Option<Duration> + 'static,
{
    if token.is_cancelled() {
        return;
    }

    let next = Rc::clone(&scheduler);
    let mut step = step;
    scheduler.schedule(
        delay,
        Box::new(move || {
            if token.is_cancelled() {
                return;
            }
            let Some(delay) = step() else {
                return;
            };
            if token.is_cancelled() {
                return;
            }
            run_loop(next, delay, token, step);
        }),
    );
}


#[cfg(test)]
mod tests {
    use super::manual::ManualScheduler;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn loop_stops_when_step_returns_none() {
        let scheduler = Rc::new(ManualScheduler::default());
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);

        run_loop(scheduler.clone(), Duration::from_millis(10), CancellationToken::new(), move || {
            counter.set(counter.get() + 1);
            (counter.get() < 3).then_some(Duration::from_millis(5))
        });

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(runs.get(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelled_loop_never_reschedules() {
        let scheduler = Rc::new(ManualScheduler::default());
        let token = CancellationToken::new();
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);

        run_loop(scheduler.clone(), Duration::from_millis(10), token.clone(), move || {
            counter.set(counter.get() + 1);
            Some(Duration::from_millis(10))
        });

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(runs.get(), 2);

        token.cancel();
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(runs.get(), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelling_inside_step_skips_reschedule() {
        let scheduler = Rc::new(ManualScheduler::default());
        let token = CancellationToken::new();
        let inner = token.clone();

        run_loop(scheduler.clone(), Duration::ZERO, token, move || {
            inner.cancel();
            Some(Duration::from_millis(1))
        });

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_scheduler_runs_in_due_order() {
        let scheduler = ManualScheduler::default();
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));

        for (label, delay) in [("late", 30), ("early", 10), ("mid", 20)] {
            let order = Rc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }

        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*order.borrow(), vec!["early", "mid", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(30));
    }
}
