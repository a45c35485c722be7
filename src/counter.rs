use crate::{
    config::MotionConfig,
    timer::{run_loop, CancellationToken, Scheduler},
};
use std::{cell::RefCell, rc::Rc, time::Duration};

/// Counts up to `target` in equal per-frame steps.
#[derive(Clone, Debug, PartialEq)]
pub struct StatCounter {
    target: u32,
    step: f64,
    current: f64,
    frame: Duration,
    finished: bool,
}

impl StatCounter {
    pub fn new(target: u32, motion: &MotionConfig) -> Self {
        let frames = (motion.stats_duration_ms as f64 / motion.stats_frame_ms as f64).max(1.0);
        Self {
            target,
            step: f64::from(target) / frames,
            current: 0.0,
            frame: Duration::from_millis(motion.stats_frame_ms),
            finished: false,
        }
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Value to show right now.
    pub fn display(&self) -> u32 {
        if self.finished {
            self.target
        } else {
            self.current.floor() as u32
        }
    }

    /// Advances one frame; returns `false` once the target has been reached.
    pub fn tick(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.current += self.step;
        if self.current >= f64::from(self.target) {
            self.finished = true;
        }
        !self.finished
    }
}

/// Ticks every counter once per frame after `start_delay`, calling `on_frame`
/// after each frame, until all of them have finished.
pub fn start<F>(
    counters: Rc<RefCell<Vec<StatCounter>>>,
    scheduler: Rc<dyn Scheduler>,
    start_delay: Duration,
    on_frame: F,
) -> CancellationToken
where
    F: Fn() + 'static,
{
    let token = CancellationToken::new();
    let frame = counters
        .borrow()
        .first()
        .map(StatCounter::frame)
        .unwrap_or(Duration::ZERO);

    run_loop(scheduler, start_delay, token.clone(), move || {
        let running = counters
            .borrow_mut()
            .iter_mut()
            .fold(false, |running, counter| counter.tick() || running);
        on_frame();
        running.then_some(frame)
    });

    token
}
