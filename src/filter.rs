//! Tab-style project filter with staged show/hide transitions.

use crate::config::MotionConfig;
use std::time::Duration;

const ALL_KEY: &str = "all";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterKey {
    All,
    Category(String),
}

impl FilterKey {
    pub fn parse(value: &str) -> Self {
        if value == ALL_KEY {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_KEY,
            Self::Category(category) => category,
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Category(wanted) => wanted == category,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardState {
    /// Takes up layout space (`display: block`).
    pub displayed: bool,
    /// Fully opaque and in place.
    pub settled: bool,
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStep {
    Settle,
    Remove,
}

/// A transition half that has to wait; hand it back to [`ProjectBoard::apply`]
/// once `delay` has passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredStep {
    pub card: usize,
    pub step: CardStep,
    pub delay: Duration,
    generation: u64,
}

#[derive(Clone, Debug)]
pub struct ProjectBoard {
    categories: Vec<String>,
    cards: Vec<CardState>,
    active: FilterKey,
    show_delay: Duration,
    hide_delay: Duration,
}

impl ProjectBoard {
    /// `categories` holds each card's category, in card order.
    pub fn new(categories: Vec<String>, motion: &MotionConfig) -> Self {
        let cards = vec![
            CardState {
                displayed: true,
                settled: true,
                generation: 0,
            };
            categories.len()
        ];
        Self {
            categories,
            cards,
            active: FilterKey::All,
            show_delay: Duration::from_millis(motion.filter_show_delay_ms),
            hide_delay: Duration::from_millis(motion.filter_hide_delay_ms),
        }
    }

    pub fn active(&self) -> &FilterKey {
        &self.active
    }

    pub fn card(&self, index: usize) -> Option<CardState> {
        self.cards.get(index).copied()
    }

    pub fn visible_count(&self) -> usize {
        self.categories
            .iter()
            .filter(|category| self.active.matches(category))
            .count()
    }

    /// Switches the filter. Matching cards are displayed now and settle later;
    /// the rest fade now and leave layout later.
    pub fn select(&mut self, key: FilterKey) -> Vec<DeferredStep> {
        let mut steps = Vec::with_capacity(self.cards.len());
        for (index, (card, category)) in self.cards.iter_mut().zip(&self.categories).enumerate() {
            card.generation += 1;
            if key.matches(category) {
                card.displayed = true;
                steps.push(DeferredStep {
                    card: index,
                    step: CardStep::Settle,
                    delay: self.show_delay,
                    generation: card.generation,
                });
            } else {
                card.settled = false;
                steps.push(DeferredStep {
                    card: index,
                    step: CardStep::Remove,
                    delay: self.hide_delay,
                    generation: card.generation,
                });
            }
        }
        self.active = key;
        steps
    }

    /// Finishes a deferred step. Steps from a superseded selection are ignored.
    pub fn apply(&mut self, deferred: DeferredStep) -> bool {
        let Some(card) = self.cards.get_mut(deferred.card) else {
            return false;
        };
        if card.generation != deferred.generation {
            return false;
        }
        match deferred.step {
            CardStep::Settle => card.settled = true,
            CardStep::Remove => card.displayed = false,
        }
        true
    }
}
