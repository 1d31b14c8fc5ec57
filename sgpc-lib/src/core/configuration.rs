use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::proposal::ProjectType;
use crate::config::DEFAULT_CONFIG_REPOSITORY;
use crate::error::CreatorError;

/// School years that have their own storage server and pipeline release.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StudentYear {
    Second,
    Third,
    Fourth,
}

impl StudentYear {
    pub fn number(&self) -> u8 {
        match *self {
            StudentYear::Second => 2,
            StudentYear::Third => 3,
            StudentYear::Fourth => 4,
        }
    }

    /// Label stored on the project and its configuration, e.g. `s2`.
    pub fn track(&self) -> String {
        format!("s{}", self.number())
    }
}

impl TryFrom<u8> for StudentYear {
    type Error = CreatorError;

    fn try_from(year: u8) -> Result<Self, Self::Error> {
        match year {
            2 => Ok(StudentYear::Second),
            3 => Ok(StudentYear::Third),
            4 => Ok(StudentYear::Fourth),
            other => Err(CreatorError::ConfigurationLookupFailure(format!(
                "No pipeline configuration for student year {}, expected 2, 3 or 4",
                other
            ))),
        }
    }
}

struct Template {
    year: StudentYear,
    project_type: ProjectType,
    branch: &'static str,
}

// Documentary projects run on the same release as fiction projects of that year.
const TEMPLATES: [Template; 6] = [
    Template {
        year: StudentYear::Second,
        project_type: ProjectType::Fiction,
        branch: "release/s2",
    },
    Template {
        year: StudentYear::Second,
        project_type: ProjectType::Documentary,
        branch: "release/s2",
    },
    Template {
        year: StudentYear::Third,
        project_type: ProjectType::Fiction,
        branch: "release/s3",
    },
    Template {
        year: StudentYear::Third,
        project_type: ProjectType::Documentary,
        branch: "release/s3",
    },
    Template {
        year: StudentYear::Fourth,
        project_type: ProjectType::Fiction,
        branch: "release/s4",
    },
    Template {
        year: StudentYear::Fourth,
        project_type: ProjectType::Documentary,
        branch: "release/s4",
    },
];

/// Pipeline configuration attached to a new project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationReference {
    pub descriptor: String,
    pub track: String,
}

impl Display for ConfigurationReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.descriptor, self.track)
    }
}

pub fn select_configuration(
    year: u8,
    is_documentary: bool,
) -> Result<ConfigurationReference, CreatorError> {
    select_configuration_in(DEFAULT_CONFIG_REPOSITORY, year, is_documentary)
}

/// Looks up the configuration template for a year and project type, pointing
/// at the given configuration repository.
pub fn select_configuration_in(
    repository: &str,
    year: u8,
    is_documentary: bool,
) -> Result<ConfigurationReference, CreatorError> {
    let year = StudentYear::try_from(year)?;
    let project_type = ProjectType::from_documentary_flag(is_documentary);
    let template = TEMPLATES
        .iter()
        .find(|t| t.year == year && t.project_type == project_type)
        .ok_or_else(|| {
            CreatorError::ConfigurationLookupFailure(format!(
                "No template for {} {} projects",
                year.track(),
                project_type.as_str()
            ))
        })?;

    Ok(ConfigurationReference {
        descriptor: format!(
            "sgtk:descriptor:git_branch?branch={}&path={}",
            template.branch, repository
        ),
        track: year.track(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_year_fiction_points_at_its_release() {
        let reference = select_configuration(2, false).unwrap();
        assert_eq!(
            reference.descriptor,
            "sgtk:descriptor:git_branch?branch=release/s2&path=https://github.com/nfa-vfxim/nfa-shotgun-configuration.git"
        );
        assert_eq!(reference.track, "s2");
    }

    #[test]
    fn every_year_and_type_maps_to_one_reference() {
        for year in 2..=4u8 {
            for documentary in [false, true] {
                let first = select_configuration(year, documentary).unwrap();
                let second = select_configuration(year, documentary).unwrap();
                assert_eq!(first, second);
                assert!(first.descriptor.contains(&format!("release/s{}", year)));
                assert_eq!(
                    TEMPLATES
                        .iter()
                        .filter(|t| t.year.number() == year
                            && t.project_type == ProjectType::from_documentary_flag(documentary))
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn unknown_years_fail() {
        for year in [0u8, 1, 5, 99] {
            assert!(matches!(
                select_configuration(year, false),
                Err(CreatorError::ConfigurationLookupFailure(_))
            ));
        }
    }

    #[test]
    fn repository_can_be_overridden() {
        let reference =
            select_configuration_in("https://git.example.com/config.git", 4, true).unwrap();
        assert!(reference.descriptor.ends_with("path=https://git.example.com/config.git"));
        assert_eq!(reference.track, "s4");
    }
}
