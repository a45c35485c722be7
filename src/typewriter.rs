//! Typed-text role rotator.
//!
//! [`Typewriter`] is the pure state machine; [`start`] drives it on a
//! [`Scheduler`] and publishes each frame to a [`TextTarget`].

use crate::{
    config::TypewriterConfig,
    error::ConfigError,
    timer::{run_loop, CancellationToken, Scheduler},
};
use std::{cell::RefCell, rc::Rc, time::Duration};

/// Where the typed text is shown.
pub trait TextTarget {
    fn set_text(&self, text: &str);
}

/// An absent target swallows every frame.
impl<T: TextTarget> TextTarget for Option<T> {
    fn set_text(&self, text: &str) {
        if let Some(target) = self {
            target.set_text(text);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleSequence {
    roles: Vec<String>,
}

impl RoleSequence {
    pub fn new(roles: Vec<String>) -> Result<Self, ConfigError> {
        if roles.is_empty() {
            return Err(ConfigError::EmptyRoles);
        }
        if let Some(index) = roles.iter().position(|role| role.is_empty()) {
            return Err(ConfigError::EmptyRole(index));
        }
        Ok(Self { roles })
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.roles[index % self.roles.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypewriterTiming {
    pub startup_delay: Duration,
    pub type_interval: Duration,
    pub delete_interval: Duration,
    pub pause_at_full: Duration,
    pub pause_at_empty: Duration,
}

impl From<&TypewriterConfig> for TypewriterTiming {
    fn from(config: &TypewriterConfig) -> Self {
        Self {
            startup_delay: Duration::from_millis(config.startup_delay_ms),
            type_interval: Duration::from_millis(config.type_interval_ms),
            delete_interval: Duration::from_millis(config.delete_interval_ms),
            pause_at_full: Duration::from_millis(config.pause_at_full_ms),
            pause_at_empty: Duration::from_millis(config.pause_at_empty_ms),
        }
    }
}

impl Default for TypewriterTiming {
    fn default() -> Self {
        Self::from(&TypewriterConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Typing,
    PausingAtFull,
    Deleting,
    PausingAtEmpty,
}

#[derive(Clone, Debug)]
pub struct Typewriter {
    roles: RoleSequence,
    timing: TypewriterTiming,
    index: usize,
    // Measured in chars, not bytes.
    offset: usize,
    phase: Phase,
}

impl Typewriter {
    pub fn new(roles: RoleSequence, timing: TypewriterTiming) -> Self {
        Self {
            roles,
            timing,
            index: 0,
            offset: 0,
            phase: Phase::Typing,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn role_index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn current_role(&self) -> &str {
        self.roles.get(self.index)
    }

    /// True from the moment the full role is shown until it is erased.
    pub fn is_deleting(&self) -> bool {
        matches!(self.phase, Phase::PausingAtFull | Phase::Deleting)
    }

    pub fn visible_text(&self) -> &str {
        let role = self.current_role();
        let end = role
            .char_indices()
            .nth(self.offset)
            .map(|(byte, _)| byte)
            .unwrap_or(role.len());
        &role[..end]
    }

    /// Advances one frame and returns the delay until the next one.
    pub fn tick(&mut self) -> Duration {
        match self.phase {
            Phase::Typing => self.type_step(),
            Phase::PausingAtFull => {
                self.phase = Phase::Deleting;
                self.delete_step()
            }
            Phase::Deleting => self.delete_step(),
            Phase::PausingAtEmpty => {
                self.index = (self.index + 1) % self.roles.len();
                self.phase = Phase::Typing;
                self.type_step()
            }
        }
    }

    fn type_step(&mut self) -> Duration {
        let len = self.current_role().chars().count();
        self.offset = (self.offset + 1).min(len);
        if self.offset == len {
            self.phase = Phase::PausingAtFull;
            self.timing.pause_at_full
        } else {
            self.timing.type_interval
        }
    }

    fn delete_step(&mut self) -> Duration {
        self.offset = self.offset.saturating_sub(1);
        if self.offset == 0 {
            self.phase = Phase::PausingAtEmpty;
            self.timing.pause_at_empty
        } else {
            self.timing.delete_interval
        }
    }
}

/// Runs `typewriter` forever on `scheduler` until the returned token is cancelled.
pub fn start<T>(
    typewriter: Typewriter,
    target: T,
    scheduler: Rc<dyn Scheduler>,
) -> (CancellationToken, Rc<RefCell<Typewriter>>)
where
    T: TextTarget + 'static,
{
    let token = CancellationToken::new();
    let startup_delay = typewriter.timing.startup_delay;
    let state = Rc::new(RefCell::new(typewriter));
    let loop_state = Rc::clone(&state);

    run_loop(scheduler, startup_delay, token.clone(), move || {
        let mut typewriter = loop_state.borrow_mut();
        let delay = typewriter.tick();
        target.set_text(typewriter.visible_text());
        Some(delay)
    });

    (token, state)
}
