use std::fmt::Display;

use crate::core::validation::RejectionReason;

/// Every failure the creator reports back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorError {
    /// Empty fields, illegal characters, out of range values.
    InvalidInput(String),
    /// A project name, project code or supervisor that is already taken.
    DuplicateEntry(String),
    /// Network or API error, message kept verbatim.
    RemoteFailure(String),
    /// The year/track has no pipeline configuration.
    ConfigurationLookupFailure(String),
    /// The project exists but its pipeline configuration could not be applied.
    PartialFailure { project_id: u64, message: String },
    /// Required process settings are missing or malformed.
    Settings(String),
}

impl Display for CreatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreatorError::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            CreatorError::DuplicateEntry(e) => write!(f, "Duplicate entry: {}", e),
            CreatorError::RemoteFailure(e) => write!(f, "ShotGrid error: {}", e),
            CreatorError::ConfigurationLookupFailure(e) => {
                write!(f, "Configuration lookup failed: {}", e)
            }
            CreatorError::PartialFailure {
                project_id,
                message,
            } => write!(
                f,
                "Project {} was created but its pipeline configuration failed: {}",
                project_id, message
            ),
            CreatorError::Settings(e) => write!(f, "Settings error: {}", e),
        }
    }
}

impl std::error::Error for CreatorError {}

impl From<RejectionReason> for CreatorError {
    fn from(reason: RejectionReason) -> Self {
        match reason {
            RejectionReason::DuplicateName | RejectionReason::DuplicateCode => {
                CreatorError::DuplicateEntry(reason.message())
            }
            _ => CreatorError::InvalidInput(reason.message()),
        }
    }
}

impl From<reqwest::Error> for CreatorError {
    fn from(e: reqwest::Error) -> Self {
        CreatorError::RemoteFailure(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::Field;

    #[test]
    fn duplicates_map_to_duplicate_entry() {
        let err: CreatorError = RejectionReason::DuplicateCode.into();
        assert_eq!(
            err,
            CreatorError::DuplicateEntry("Project code already taken.".to_string())
        );
    }

    #[test]
    fn format_problems_map_to_invalid_input() {
        let err: CreatorError = RejectionReason::Empty(Field::Name).into();
        assert!(matches!(err, CreatorError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid input: You must fill in a project name.");
    }

    #[test]
    fn partial_failure_names_the_project() {
        let err = CreatorError::PartialFailure {
            project_id: 42,
            message: "descriptor rejected".to_string(),
        };
        assert!(err.to_string().starts_with("Project 42 was created"));
    }
}
