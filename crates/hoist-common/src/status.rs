use std::fmt;
use std::str::FromStr;

/// Project status vocabulary of the task manager.
///
/// Only used to spell filter predicates. Records carry the status token exactly as the
/// application reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Active,
    OnHold,
    Done,
    Dropped,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Done,
        ProjectStatus::Dropped,
    ];

    /// The token the application uses for this status.
    pub fn token(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active status",
            ProjectStatus::OnHold => "on hold status",
            ProjectStatus::Done => "done status",
            ProjectStatus::Dropped => "dropped status",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.token() == token)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown project status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = UnknownStatus;

    /// Accepts both the full token (`on hold status`) and shorthand (`on-hold`, `on_hold`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(status) = Self::from_token(s) {
            return Ok(status);
        }
        match s.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "active" => Ok(ProjectStatus::Active),
            "on hold" | "onhold" => Ok(ProjectStatus::OnHold),
            "done" | "completed" => Ok(ProjectStatus::Done),
            "dropped" => Ok(ProjectStatus::Dropped),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}
