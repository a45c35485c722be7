use crate::{error::ConfigError, log::LogLevel, typewriter::RoleSequence};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const EMBEDDED_SITE_CONFIG: &str = include_str!("../config/site.json");

const DEFAULT_STARTUP_DELAY_MS: u64 = 1_500;
const DEFAULT_TYPE_INTERVAL_MS: u64 = 100;
const DEFAULT_DELETE_INTERVAL_MS: u64 = 50;
const DEFAULT_PAUSE_AT_FULL_MS: u64 = 2_000;
const DEFAULT_PAUSE_AT_EMPTY_MS: u64 = 500;

const DEFAULT_NAVBAR_SCROLLED_AFTER: f64 = 100.0;
const DEFAULT_BACK_TO_TOP_AFTER: f64 = 500.0;
const DEFAULT_SECTION_LOOKAHEAD: f64 = 150.0;
const DEFAULT_SKILL_REVEAL_RATIO: f64 = 0.9;
const DEFAULT_REVEAL_MIN_RATIO: f64 = 0.1;
const DEFAULT_REVEAL_BOTTOM_MARGIN: f64 = 50.0;

const DEFAULT_ANCHOR_OFFSET: f64 = 80.0;
const DEFAULT_STATS_START_DELAY_MS: u64 = 1_000;
const DEFAULT_STATS_DURATION_MS: u64 = 2_000;
const DEFAULT_STATS_FRAME_MS: u64 = 16;
const DEFAULT_FILTER_SHOW_DELAY_MS: u64 = 50;
const DEFAULT_FILTER_HIDE_DELAY_MS: u64 = 300;

const STARTUP_DELAY_MS_BOUNDS: (u64, u64) = (0, 60_000);
const TICK_INTERVAL_MS_BOUNDS: (u64, u64) = (10, 2_000);
const PAUSE_MS_BOUNDS: (u64, u64) = (0, 60_000);
const SCROLL_OFFSET_BOUNDS: (f64, f64) = (0.0, 100_000.0);
const RATIO_BOUNDS: (f64, f64) = (0.0, 1.0);
const MARGIN_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const STATS_DURATION_MS_BOUNDS: (u64, u64) = (16, 60_000);
const STATS_FRAME_MS_BOUNDS: (u64, u64) = (1, 1_000);
const FILTER_DELAY_MS_BOUNDS: (u64, u64) = (0, 5_000);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub profile: Profile,
    pub roles: Vec<String>,
    pub nav: Vec<NavEntry>,
    pub sections: Vec<SectionEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    pub contact: Contact,
    #[serde(default)]
    pub typewriter: TypewriterConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub log_level: LogLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub tagline: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NavEntry {
    pub label: String,
    pub section: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    About,
    Skills,
    Projects,
    Contact,
    #[default]
    Text,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: SectionKind,
    #[serde(default)]
    pub body: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub level: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub label: String,
    pub target: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub startup_delay_ms: u64,
    pub type_interval_ms: u64,
    pub delete_interval_ms: u64,
    pub pause_at_full_ms: u64,
    pub pause_at_empty_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            type_interval_ms: DEFAULT_TYPE_INTERVAL_MS,
            delete_interval_ms: DEFAULT_DELETE_INTERVAL_MS,
            pause_at_full_ms: DEFAULT_PAUSE_AT_FULL_MS,
            pause_at_empty_ms: DEFAULT_PAUSE_AT_EMPTY_MS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub navbar_scrolled_after: f64,
    pub back_to_top_after: f64,
    pub section_lookahead: f64,
    pub skill_reveal_ratio: f64,
    pub reveal_min_ratio: f64,
    pub reveal_bottom_margin: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            navbar_scrolled_after: DEFAULT_NAVBAR_SCROLLED_AFTER,
            back_to_top_after: DEFAULT_BACK_TO_TOP_AFTER,
            section_lookahead: DEFAULT_SECTION_LOOKAHEAD,
            skill_reveal_ratio: DEFAULT_SKILL_REVEAL_RATIO,
            reveal_min_ratio: DEFAULT_REVEAL_MIN_RATIO,
            reveal_bottom_margin: DEFAULT_REVEAL_BOTTOM_MARGIN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub anchor_offset: f64,
    pub stats_start_delay_ms: u64,
    pub stats_duration_ms: u64,
    pub stats_frame_ms: u64,
    pub filter_show_delay_ms: u64,
    pub filter_hide_delay_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            anchor_offset: DEFAULT_ANCHOR_OFFSET,
            stats_start_delay_ms: DEFAULT_STATS_START_DELAY_MS,
            stats_duration_ms: DEFAULT_STATS_DURATION_MS,
            stats_frame_ms: DEFAULT_STATS_FRAME_MS,
            filter_show_delay_ms: DEFAULT_FILTER_SHOW_DELAY_MS,
            filter_hide_delay_ms: DEFAULT_FILTER_HIDE_DELAY_MS,
        }
    }
}

impl SiteConfig {
    /// The config compiled into the binary; used when nothing better is available.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED_SITE_CONFIG)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn role_sequence(&self) -> Result<RoleSequence, ConfigError> {
        RoleSequence::new(self.roles.clone())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.role_sequence()?;

        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(ConfigError::DuplicateSection(section.id.clone()));
            }
        }

        if let Some(entry) = self
            .nav
            .iter()
            .find(|entry| !seen.contains(entry.section.as_str()))
        {
            return Err(ConfigError::UnknownSection {
                label: entry.label.clone(),
                section: entry.section.clone(),
            });
        }

        if let Some(skill) = self.skills.iter().find(|skill| skill.level > 100) {
            return Err(ConfigError::SkillLevel {
                name: skill.name.clone(),
                level: skill.level,
            });
        }

        let typewriter = &self.typewriter;
        ensure_u64("typewriter.startup_delay_ms", typewriter.startup_delay_ms, STARTUP_DELAY_MS_BOUNDS)?;
        ensure_u64("typewriter.type_interval_ms", typewriter.type_interval_ms, TICK_INTERVAL_MS_BOUNDS)?;
        ensure_u64("typewriter.delete_interval_ms", typewriter.delete_interval_ms, TICK_INTERVAL_MS_BOUNDS)?;
        ensure_u64("typewriter.pause_at_full_ms", typewriter.pause_at_full_ms, PAUSE_MS_BOUNDS)?;
        ensure_u64("typewriter.pause_at_empty_ms", typewriter.pause_at_empty_ms, PAUSE_MS_BOUNDS)?;

        let scroll = &self.scroll;
        ensure_f64("scroll.navbar_scrolled_after", scroll.navbar_scrolled_after, SCROLL_OFFSET_BOUNDS)?;
        ensure_f64("scroll.back_to_top_after", scroll.back_to_top_after, SCROLL_OFFSET_BOUNDS)?;
        ensure_f64("scroll.section_lookahead", scroll.section_lookahead, SCROLL_OFFSET_BOUNDS)?;
        ensure_f64("scroll.skill_reveal_ratio", scroll.skill_reveal_ratio, RATIO_BOUNDS)?;
        ensure_f64("scroll.reveal_min_ratio", scroll.reveal_min_ratio, RATIO_BOUNDS)?;
        ensure_f64("scroll.reveal_bottom_margin", scroll.reveal_bottom_margin, MARGIN_BOUNDS)?;

        let motion = &self.motion;
        ensure_f64("motion.anchor_offset", motion.anchor_offset, MARGIN_BOUNDS)?;
        ensure_u64("motion.stats_start_delay_ms", motion.stats_start_delay_ms, PAUSE_MS_BOUNDS)?;
        ensure_u64("motion.stats_duration_ms", motion.stats_duration_ms, STATS_DURATION_MS_BOUNDS)?;
        ensure_u64("motion.stats_frame_ms", motion.stats_frame_ms, STATS_FRAME_MS_BOUNDS)?;
        ensure_u64("motion.filter_show_delay_ms", motion.filter_show_delay_ms, FILTER_DELAY_MS_BOUNDS)?;
        ensure_u64("motion.filter_hide_delay_ms", motion.filter_hide_delay_ms, FILTER_DELAY_MS_BOUNDS)?;

        Ok(())
    }

    /// Distinct project categories in first-seen order.
    pub fn project_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.projects
            .iter()
            .filter(|project| seen.insert(project.category.as_str()))
            .map(|project| project.category.clone())
            .collect()
    }

    /// Reveal-on-scroll blocks: project cards, then stat cards, then the skill list.
    pub fn reveal_block_count(&self) -> usize {
        self.skill_list_block() + 1
    }

    pub fn stat_block(&self, index: usize) -> usize {
        self.projects.len() + index
    }

    pub fn skill_list_block(&self) -> usize {
        self.projects.len() + self.stats.len()
    }
}

fn ensure_u64(field: &'static str, value: u64, bounds: (u64, u64)) -> Result<(), ConfigError> {
    if (bounds.0..=bounds.1).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfBounds {
        field,
        value: value as f64,
        min: bounds.0 as f64,
        max: bounds.1 as f64,
    })
}

fn ensure_f64(field: &'static str, value: f64, bounds: (f64, f64)) -> Result<(), ConfigError> {
    if (bounds.0..=bounds.1).contains(&value) {
        return Ok(());
    }
    Err(ConfigError::OutOfBounds {
        field,
        value,
        min: bounds.0,
        max: bounds.1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal() -> serde_json::Value {
        serde_json::json!({
            "profile": { "name": "Ada", "tagline": "Builds things" },
            "roles": ["Engineer"],
            "nav": [{ "label": "Home", "section": "home" }],
            "sections": [{ "id": "home", "title": "Home", "kind": "hero" }],
            "contact": { "email": "ada@example.com" }
        })
    }

    #[test]
    fn embedded_config_is_valid() {
        let config = SiteConfig::embedded().expect("embedded config parses and validates");
        assert!(!config.roles.is_empty());
        assert!(config.sections.iter().any(|section| section.kind == SectionKind::Hero));
    }

    #[test]
    fn omitted_blocks_take_defaults() {
        let config = SiteConfig::from_json(&minimal().to_string()).expect("minimal config");
        assert_eq!(config.typewriter, TypewriterConfig::default());
        assert_eq!(config.scroll.navbar_scrolled_after, 100.0);
        assert_eq!(config.scroll.back_to_top_after, 500.0);
        assert_eq!(config.motion.anchor_offset, 80.0);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.sections[0].kind, SectionKind::Hero);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(SiteConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn empty_roles_are_rejected() {
        let mut raw = minimal();
        raw["roles"] = serde_json::json!([]);
        assert!(matches!(
            SiteConfig::from_json(&raw.to_string()),
            Err(ConfigError::EmptyRoles)
        ));
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let mut raw = minimal();
        raw["sections"] = serde_json::json!([
            { "id": "home", "title": "Home" },
            { "id": "home", "title": "Again" }
        ]);
        assert!(matches!(
            SiteConfig::from_json(&raw.to_string()),
            Err(ConfigError::DuplicateSection(id)) if id == "home"
        ));
    }

    #[test]
    fn nav_entries_must_point_at_known_sections() {
        let mut raw = minimal();
        raw["nav"] = serde_json::json!([{ "label": "Blog", "section": "blog" }]);
        assert!(matches!(
            SiteConfig::from_json(&raw.to_string()),
            Err(ConfigError::UnknownSection { section, .. }) if section == "blog"
        ));
    }

    #[test]
    fn skill_levels_above_one_hundred_are_rejected() {
        let mut raw = minimal();
        raw["skills"] = serde_json::json!([{ "name": "Rust", "level": 120 }]);
        assert!(matches!(
            SiteConfig::from_json(&raw.to_string()),
            Err(ConfigError::SkillLevel { level: 120, .. })
        ));
    }

    #[test]
    fn out_of_bounds_timing_is_rejected() {
        let mut raw = minimal();
        raw["typewriter"] = serde_json::json!({ "type_interval_ms": 1 });
        let error = SiteConfig::from_json(&raw.to_string()).expect_err("1ms is below bounds");
        assert!(matches!(
            error,
            ConfigError::OutOfBounds { field: "typewriter.type_interval_ms", .. }
        ));
    }

    #[test]
    fn ratio_above_one_is_rejected() {
        let mut raw = minimal();
        raw["scroll"] = serde_json::json!({ "skill_reveal_ratio": 1.5 });
        assert!(matches!(
            SiteConfig::from_json(&raw.to_string()),
            Err(ConfigError::OutOfBounds { field: "scroll.skill_reveal_ratio", .. })
        ));
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let mut raw = minimal();
        raw["projects"] = serde_json::json!([
            { "title": "A", "category": "web", "description": "" },
            { "title": "B", "category": "mobile", "description": "" },
            { "title": "C", "category": "web", "description": "" }
        ]);
        let config = SiteConfig::from_json(&raw.to_string()).expect("valid config");
        assert_eq!(config.project_categories(), vec!["web", "mobile"]);
    }

    #[test]
    fn reveal_blocks_cover_cards_stats_and_the_skill_list() {
        let mut raw = minimal();
        raw["projects"] = serde_json::json!([
            { "title": "A", "category": "web", "description": "" },
            { "title": "B", "category": "mobile", "description": "" }
        ]);
        raw["stats"] = serde_json::json!([
            { "label": "Projects", "target": 40 },
            { "label": "Clients", "target": 12 },
            { "label": "Years", "target": 5 }
        ]);
        let config = SiteConfig::from_json(&raw.to_string()).expect("valid config");

        assert_eq!(config.stat_block(0), 2);
        assert_eq!(config.stat_block(2), 4);
        assert_eq!(config.skill_list_block(), 5);
        assert_eq!(config.reveal_block_count(), 6);
    }
}
