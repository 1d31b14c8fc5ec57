use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CreatorError;

pub const DEFAULT_FPS: u32 = 25;
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 120;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeKind {
    /// A short letter code made up by the student, e.g. `abc`.
    #[default]
    Mnemonic,
    /// A school production code, `p` followed by five digits.
    Production,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectType {
    #[default]
    Fiction,
    Documentary,
}

impl ProjectType {
    pub fn from_documentary_flag(is_documentary: bool) -> Self {
        if is_documentary {
            ProjectType::Documentary
        } else {
            ProjectType::Fiction
        }
    }

    pub fn as_str(&self) -> &str {
        match *self {
            ProjectType::Fiction => "Fiction",
            ProjectType::Documentary => "Documentary",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderEngine {
    #[default]
    All,
    Arnold,
    Karma,
    RenderMan,
}

impl RenderEngine {
    pub fn as_str(&self) -> &str {
        match *self {
            RenderEngine::All => "All",
            RenderEngine::Arnold => "Arnold",
            RenderEngine::Karma => "Karma",
            RenderEngine::RenderMan => "RenderMan",
        }
    }
}

impl FromStr for RenderEngine {
    type Err = CreatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(RenderEngine::All),
            "arnold" => Ok(RenderEngine::Arnold),
            "karma" => Ok(RenderEngine::Karma),
            "renderman" => Ok(RenderEngine::RenderMan),
            _ => Err(CreatorError::InvalidInput(format!(
                "Unknown render engine '{}', expected All, Arnold, Karma or RenderMan.",
                s
            ))),
        }
    }
}

/// Permission group reference as ShotGrid returns it on a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PermissionGroup {
    pub id: u64,
    pub name: String,
}

/// A user record from the remote tracker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrackerUser {
    pub id: u64,
    pub name: String,
    /// Graduation cohort, e.g. `L2026`.
    pub cohort: Option<String>,
    pub permission_group: Option<PermissionGroup>,
}

impl TrackerUser {
    pub fn is_artist(&self) -> bool {
        self.permission_group
            .as_ref()
            .map(|group| group.name == "Artist")
            .unwrap_or(false)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorList(Vec<TrackerUser>);

impl SupervisorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, user: TrackerUser) -> Result<&TrackerUser, CreatorError> {
        if self.0.iter().any(|s| s.id == user.id) {
            return Err(CreatorError::DuplicateEntry(
                "This supervisor has already been added.".to_string(),
            ));
        }
        self.0.push(user);
        Ok(&self.0[self.0.len() - 1])
    }

    pub fn remove(&mut self, name: &str) -> Result<TrackerUser, CreatorError> {
        match self.0.iter().position(|s| s.name == name) {
            Some(index) => Ok(self.0.remove(index)),
            None => Err(CreatorError::InvalidInput(
                "Can't remove because supervisor isn't on the list.".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackerUser> {
        self.0.iter()
    }
}

/// The fields of a project the user wants created, typed at the input boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectProposal {
    pub name: String,
    pub code: String,
    pub code_kind: CodeKind,
    /// Student year/track, checked by the configuration selector.
    pub year: u8,
    pub project_type: ProjectType,
    pub render_engine: RenderEngine,
    pub fps: u32,
    pub supervisors: SupervisorList,
}

impl ProjectProposal {
    pub fn new(name: &str, code: &str, year: u8, is_documentary: bool) -> Self {
        ProjectProposal {
            name: name.trim().to_string(),
            code: code.trim().to_string(),
            code_kind: CodeKind::default(),
            year,
            project_type: ProjectType::from_documentary_flag(is_documentary),
            render_engine: RenderEngine::default(),
            fps: DEFAULT_FPS,
            supervisors: SupervisorList::new(),
        }
    }

    pub fn with_code_kind(self, code_kind: CodeKind) -> Self {
        Self { code_kind, ..self }
    }

    pub fn with_render_engine(self, render_engine: RenderEngine) -> Self {
        Self {
            render_engine,
            ..self
        }
    }

    pub fn with_fps(self, fps: u32) -> Self {
        Self { fps, ..self }
    }

    pub fn is_documentary(&self) -> bool {
        self.project_type == ProjectType::Documentary
    }

    /// Codes are stored lowercase on the remote side.
    pub fn normalized_code(&self) -> String {
        self.code.to_lowercase()
    }

    pub fn check_fps(&self) -> Result<(), CreatorError> {
        if (MIN_FPS..=MAX_FPS).contains(&self.fps) {
            Ok(())
        } else {
            Err(CreatorError::InvalidInput(format!(
                "FPS must be between {} and {}, got {}.",
                MIN_FPS, MAX_FPS, self.fps
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: &str, group: &str) -> TrackerUser {
        TrackerUser {
            id,
            name: name.to_string(),
            cohort: None,
            permission_group: Some(PermissionGroup {
                id: 8,
                name: group.to_string(),
            }),
        }
    }

    #[test]
    fn new_proposal_uses_form_defaults() {
        let proposal = ProjectProposal::new(" spaceship ", "ABC", 3, true);
        assert_eq!(proposal.name, "spaceship");
        assert_eq!(proposal.code_kind, CodeKind::Mnemonic);
        assert_eq!(proposal.render_engine, RenderEngine::All);
        assert_eq!(proposal.fps, 25);
        assert!(proposal.is_documentary());
        assert_eq!(proposal.normalized_code(), "abc");
    }

    #[test]
    fn fps_outside_range_is_rejected() {
        let proposal = ProjectProposal::new("a", "abc", 2, false);
        assert!(proposal.clone().with_fps(120).check_fps().is_ok());
        assert!(matches!(
            proposal.clone().with_fps(0).check_fps(),
            Err(CreatorError::InvalidInput(_))
        ));
        assert!(proposal.with_fps(121).check_fps().is_err());
    }

    #[test]
    fn render_engine_parses_case_insensitively() {
        assert_eq!("renderman".parse::<RenderEngine>().unwrap(), RenderEngine::RenderMan);
        assert_eq!("Karma".parse::<RenderEngine>().unwrap(), RenderEngine::Karma);
        assert!("cycles".parse::<RenderEngine>().is_err());
    }

    #[test]
    fn supervisor_list_refuses_duplicates() {
        let mut list = SupervisorList::new();
        list.add(user(1, "Jane Doe", "Artist")).unwrap();
        let again = list.add(user(1, "Jane Doe", "Artist"));
        assert!(matches!(again, Err(CreatorError::DuplicateEntry(_))));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn supervisor_list_removes_by_name() {
        let mut list = SupervisorList::new();
        list.add(user(1, "Jane Doe", "Artist")).unwrap();
        list.add(user(2, "John Roe", "Supervisor")).unwrap();
        assert!(list.remove("Nobody").is_err());
        let removed = list.remove("Jane Doe").unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(list.iter().map(|s| s.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn only_artists_need_promotion() {
        assert!(user(1, "a", "Artist").is_artist());
        assert!(!user(2, "b", "Supervisor").is_artist());
        let no_group = TrackerUser {
            permission_group: None,
            ..user(3, "c", "Artist")
        };
        assert!(!no_group.is_artist());
    }
}
