use thiserror::Error;

/// Reasons a site config is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read site config: {0}")]
    Io(#[from] std::io::Error),

    #[error("role list is empty")]
    EmptyRoles,

    #[error("role at index {0} is empty")]
    EmptyRole(usize),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfBounds {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("section id `{0}` is declared more than once")]
    DuplicateSection(String),

    #[error("nav entry `{label}` points at unknown section `{section}`")]
    UnknownSection { label: String, section: String },

    #[error("skill `{name}` has level {level}, expected 0..=100")]
    SkillLevel { name: String, level: u8 },
}
