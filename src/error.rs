use thiserror::Error;

/// What kind of catalog or worktable entry a lookup failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    LabwareType,
    TipType,
    LiquidClass,
    TargetLocation,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntryKind::LabwareType => "labware type",
            EntryKind::TipType => "tip type",
            EntryKind::LiquidClass => "liquid class",
            EntryKind::TargetLocation => "target location",
        };
        f.write_str(name)
    }
}

fn container_suffix(container: &Option<String>) -> String {
    container
        .as_ref()
        .map(|c| format!(" in container type \"{c}\""))
        .unwrap_or_default()
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown {kind}: \"{id}\"")]
    NotFound { kind: EntryKind, id: String },

    #[error("Sequencing error: {0}")]
    Sequencing(String),

    #[error("No tip type can hold {volume} ul{}", container_suffix(.container))]
    NoTipAvailable {
        volume: f64,
        container: Option<String>,
    },

    #[error("Capacity of \"{target}\" exceeded (labware type: \"{labware_type}\")")]
    CapacityExceeded {
        target: String,
        labware_type: String,
    },

    #[error("Invalid worklist line {line}: {reason}")]
    InvalidWorklist { line: usize, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn not_found(kind: EntryKind, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Errors caused by caller input rather than by the environment
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Config(_) | Error::InvalidWorklist { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
