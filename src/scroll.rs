//! Scroll-derived page state.
//!
//! The reactor is fed one [`ScrollSnapshot`] plus the layout measured at that
//! moment, and derives navbar mode, back-to-top visibility, the active section
//! and the one-way reveal latches for skill bars and cards.

use crate::config::ScrollConfig;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSnapshot {
    pub offset: f64,
    pub viewport_height: f64,
}

/// A section's document-relative vertical extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionBounds {
    pub top: f64,
    pub height: f64,
}

impl SectionBounds {
    /// Half-open: `[top, top + height)`.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.top && position < self.top + self.height
    }
}

/// A viewport-relative element box, as returned by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

/// What the page measured for one scroll event. Entries line up with the
/// sections, skill bars and reveal blocks the reactor was built with; `None`
/// marks an element that is not in the document.
#[derive(Clone, Copy, Debug, Default)]
pub struct Measurements<'a> {
    pub sections: &'a [Option<SectionBounds>],
    pub skill_bar_tops: &'a [Option<f64>],
    pub reveal_rects: &'a [Option<ElementRect>],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub navbar_scrolled_after: f64,
    pub back_to_top_after: f64,
    pub section_lookahead: f64,
    pub skill_reveal_ratio: f64,
    pub reveal_min_ratio: f64,
    pub reveal_bottom_margin: f64,
}

impl From<&ScrollConfig> for Thresholds {
    fn from(config: &ScrollConfig) -> Self {
        Self {
            navbar_scrolled_after: config.navbar_scrolled_after,
            back_to_top_after: config.back_to_top_after,
            section_lookahead: config.section_lookahead,
            skill_reveal_ratio: config.skill_reveal_ratio,
            reveal_min_ratio: config.reveal_min_ratio,
            reveal_bottom_margin: config.reveal_bottom_margin,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&ScrollConfig::default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SkillBar {
    pub target_percent: u8,
    revealed: bool,
}

impl SkillBar {
    pub fn new(target_percent: u8) -> Self {
        Self {
            target_percent: target_percent.min(100),
            revealed: false,
        }
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    /// The fill to render: the target once revealed, nothing before.
    pub fn fill_percent(&self) -> Option<u8> {
        self.revealed.then_some(self.target_percent)
    }
}

/// Everything the page renders from scroll position.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ScrollView {
    pub navbar_scrolled: bool,
    pub back_to_top_visible: bool,
    pub active_section: Option<usize>,
    pub active_link: Option<usize>,
    pub skill_bars: Vec<SkillBar>,
    pub revealed_blocks: Vec<bool>,
}

impl ScrollView {
    pub fn link_is_active(&self, link: usize) -> bool {
        self.active_link == Some(link)
    }

    pub fn block_is_revealed(&self, block: usize) -> bool {
        self.revealed_blocks.get(block).copied().unwrap_or(false)
    }

    pub fn skill_fill(&self, bar: usize) -> Option<u8> {
        self.skill_bars.get(bar).and_then(SkillBar::fill_percent)
    }
}

#[derive(Clone, Debug)]
pub struct ScrollReactor {
    thresholds: Thresholds,
    link_for_section: Vec<Option<usize>>,
    view: ScrollView,
}

impl ScrollReactor {
    /// `section_ids` are in document order; `link_targets` holds the section id
    /// each nav link points at, in link order. The section → link pairing is
    /// resolved here once.
    pub fn new<S, L>(
        thresholds: Thresholds,
        section_ids: &[S],
        link_targets: &[L],
        skill_levels: &[u8],
        reveal_blocks: usize,
    ) -> Self
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let mut link_by_id: HashMap<&str, usize> = HashMap::new();
        for (link, target) in link_targets.iter().enumerate() {
            link_by_id.entry(target.as_ref()).or_insert(link);
        }
        let link_for_section = section_ids
            .iter()
            .map(|id| link_by_id.get(id.as_ref()).copied())
            .collect();

        Self {
            thresholds,
            link_for_section,
            view: ScrollView {
                skill_bars: skill_levels.iter().copied().map(SkillBar::new).collect(),
                revealed_blocks: vec![false; reveal_blocks],
                ..ScrollView::default()
            },
        }
    }

    pub fn view(&self) -> &ScrollView {
        &self.view
    }

    /// Recomputes the view; returns whether anything visible changed.
    pub fn react(&mut self, snapshot: ScrollSnapshot, measured: Measurements<'_>) -> bool {
        let before = self.view.clone();
        let thresholds = self.thresholds;

        self.view.navbar_scrolled = snapshot.offset > thresholds.navbar_scrolled_after;
        self.view.back_to_top_visible = snapshot.offset > thresholds.back_to_top_after;

        let lookahead = snapshot.offset + thresholds.section_lookahead;
        self.view.active_section = measured
            .sections
            .iter()
            .take(self.link_for_section.len())
            .position(|bounds| bounds.is_some_and(|bounds| bounds.contains(lookahead)));
        self.view.active_link = self
            .view
            .active_section
            .and_then(|section| self.link_for_section[section]);

        let reveal_line = snapshot.viewport_height * thresholds.skill_reveal_ratio;
        for (bar, top) in self.view.skill_bars.iter_mut().zip(measured.skill_bar_tops) {
            if top.is_some_and(|top| top < reveal_line) {
                bar.revealed = true;
            }
        }

        for (revealed, rect) in self.view.revealed_blocks.iter_mut().zip(measured.reveal_rects) {
            if rect.is_some_and(|rect| intersects_enough(rect, snapshot, &thresholds)) {
                *revealed = true;
            }
        }

        self.view != before
    }
}

/// IntersectionObserver-style test against the viewport shrunk by a bottom margin.
fn intersects_enough(rect: ElementRect, snapshot: ScrollSnapshot, thresholds: &Thresholds) -> bool {
    let root_bottom = snapshot.viewport_height - thresholds.reveal_bottom_margin;
    let visible = rect.top.max(0.0)..(rect.top + rect.height).min(root_bottom);
    let overlap = visible.end - visible.start;
    if overlap <= 0.0 {
        return false;
    }
    if rect.height <= 0.0 {
        return true;
    }
    overlap / rect.height >= thresholds.reveal_min_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(offset: f64) -> ScrollSnapshot {
        ScrollSnapshot {
            offset,
            viewport_height: 800.0,
        }
    }

    fn home_about() -> Vec<Option<SectionBounds>> {
        vec![
            Some(SectionBounds { top: 0.0, height: 500.0 }),
            Some(SectionBounds { top: 500.0, height: 500.0 }),
        ]
    }

    fn reactor() -> ScrollReactor {
        ScrollReactor::new(
            Thresholds::default(),
            &["home", "about"],
            &["home", "about"],
            &[80, 60],
            2,
        )
    }

    #[test]
    fn navbar_flag_is_strictly_greater_than_threshold() {
        let mut reactor = reactor();
        for (offset, expected) in [(0.0, false), (99.0, false), (100.0, false), (101.0, true)] {
            reactor.react(snapshot(offset), Measurements::default());
            assert_eq!(reactor.view().navbar_scrolled, expected, "offset {offset}");
        }
    }

    #[test]
    fn back_to_top_appears_past_five_hundred() {
        let mut reactor = reactor();
        reactor.react(snapshot(500.0), Measurements::default());
        assert!(!reactor.view().back_to_top_visible);
        reactor.react(snapshot(500.5), Measurements::default());
        assert!(reactor.view().back_to_top_visible);
        reactor.react(snapshot(10.0), Measurements::default());
        assert!(!reactor.view().back_to_top_visible);
    }

    #[test]
    fn lookahead_selects_about_for_worked_example() {
        let mut reactor = reactor();
        let sections = home_about();
        reactor.react(
            snapshot(400.0),
            Measurements {
                sections: &sections,
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().active_section, Some(1));
        assert!(reactor.view().link_is_active(1));
        assert!(!reactor.view().link_is_active(0));
    }

    #[test]
    fn section_boundaries_are_half_open() {
        let mut reactor = reactor();
        let sections = home_about();
        let measured = Measurements {
            sections: &sections,
            ..Measurements::default()
        };

        reactor.react(snapshot(349.0), measured);
        assert_eq!(reactor.view().active_link, Some(0));
        reactor.react(snapshot(350.0), measured);
        assert_eq!(reactor.view().active_link, Some(1));
        reactor.react(snapshot(850.0), measured);
        assert_eq!(reactor.view().active_link, None);
    }

    #[test]
    fn overlapping_sections_resolve_to_first_in_document_order() {
        let mut reactor = reactor();
        let sections = vec![
            Some(SectionBounds { top: 0.0, height: 1000.0 }),
            Some(SectionBounds { top: 500.0, height: 500.0 }),
        ];
        reactor.react(
            snapshot(400.0),
            Measurements {
                sections: &sections,
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().active_link, Some(0));
    }

    #[test]
    fn absent_section_never_matches() {
        let mut reactor = reactor();
        let sections = vec![None, Some(SectionBounds { top: 500.0, height: 500.0 })];
        let measured = Measurements {
            sections: &sections,
            ..Measurements::default()
        };
        reactor.react(snapshot(0.0), measured);
        assert_eq!(reactor.view().active_section, None);
        reactor.react(snapshot(400.0), measured);
        assert_eq!(reactor.view().active_section, Some(1));
    }

    #[test]
    fn section_without_nav_link_leaves_every_link_inactive() {
        let mut reactor = ScrollReactor::new(
            Thresholds::default(),
            &["home", "contact"],
            &["home"],
            &[],
            0,
        );
        let sections = home_about();
        reactor.react(
            snapshot(400.0),
            Measurements {
                sections: &sections,
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().active_section, Some(1));
        assert_eq!(reactor.view().active_link, None);
    }

    #[test]
    fn skill_reveal_latches_and_never_reverts() {
        let mut reactor = reactor();
        // 0.9 * 800 = 720
        reactor.react(
            snapshot(0.0),
            Measurements {
                skill_bar_tops: &[Some(720.0), Some(900.0)],
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().skill_fill(0), None);

        reactor.react(
            snapshot(300.0),
            Measurements {
                skill_bar_tops: &[Some(719.0), Some(600.0)],
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().skill_fill(0), Some(80));
        assert_eq!(reactor.view().skill_fill(1), Some(60));

        reactor.react(
            snapshot(0.0),
            Measurements {
                skill_bar_tops: &[Some(2000.0), None],
                ..Measurements::default()
            },
        );
        assert_eq!(reactor.view().skill_fill(0), Some(80));
        assert_eq!(reactor.view().skill_fill(1), Some(60));
    }

    #[test]
    fn absent_skill_bar_is_skipped() {
        let mut reactor = reactor();
        reactor.react(
            snapshot(0.0),
            Measurements {
                skill_bar_tops: &[None, Some(10.0)],
                ..Measurements::default()
            },
        );
        assert!(!reactor.view().skill_bars[0].revealed());
        assert!(reactor.view().skill_bars[1].revealed());
    }

    #[test]
    fn blocks_reveal_once_a_tenth_is_inside_the_margin() {
        let mut reactor = reactor();
        // Root bottom is 800 - 50 = 750; a 200px card needs 20px above it.
        let measured = |top: f64| {
            vec![Some(ElementRect { top, height: 200.0 }), None]
        };

        let rects = measured(735.0);
        reactor.react(
            snapshot(0.0),
            Measurements {
                reveal_rects: &rects,
                ..Measurements::default()
            },
        );
        assert!(!reactor.view().block_is_revealed(0));

        let rects = measured(730.0);
        reactor.react(
            snapshot(0.0),
            Measurements {
                reveal_rects: &rects,
                ..Measurements::default()
            },
        );
        assert!(reactor.view().block_is_revealed(0));
        assert!(!reactor.view().block_is_revealed(1));

        let rects = measured(-5000.0);
        reactor.react(
            snapshot(0.0),
            Measurements {
                reveal_rects: &rects,
                ..Measurements::default()
            },
        );
        assert!(reactor.view().block_is_revealed(0));
    }

    #[test]
    fn react_reports_change_only_when_view_differs() {
        let mut reactor = reactor();
        assert!(!reactor.react(snapshot(50.0), Measurements::default()));
        assert!(reactor.react(snapshot(150.0), Measurements::default()));
        assert!(!reactor.react(snapshot(160.0), Measurements::default()));
    }

    #[test]
    fn duplicate_link_targets_pair_with_first_link() {
        let reactor = ScrollReactor::new(
            Thresholds::default(),
            &["home"],
            &["home", "home"],
            &[],
            0,
        );
        assert_eq!(reactor.link_for_section, vec![Some(0)]);
    }
}
