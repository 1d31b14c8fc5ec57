pub mod configuration;
pub mod proposal;
pub mod user;
pub mod validation;

use async_trait::async_trait;

use self::{
    configuration::{select_configuration_in, ConfigurationReference},
    proposal::{CodeKind, ProjectProposal, ProjectType, RenderEngine, TrackerUser},
    user::SessionUser,
    validation::{check_code, check_name, validate_with, ExistingProjectIndex, FieldCheck, ValidationResult},
};
use crate::{config::Settings, error::CreatorError};

/// Fields sent to the tracker when a project is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub code: String,
    pub supervisors: Vec<u64>,
    pub render_engine: RenderEngine,
    pub project_type: ProjectType,
    pub cohort: String,
    pub fps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    pub id: u64,
    pub url: String,
}

/// The remote project-management service.
#[async_trait]
pub trait ProjectTracker: Send + Sync {
    async fn list_existing_projects(&self) -> Result<ExistingProjectIndex, CreatorError>;

    /// Looks a user up by display name, then by login.
    async fn find_user(&self, username: &str) -> Result<Option<TrackerUser>, CreatorError>;

    /// Moves an artist into the supervisor permission group.
    async fn promote_to_supervisor(&self, user: &TrackerUser) -> Result<(), CreatorError>;

    async fn create_project(&self, project: &NewProject) -> Result<u64, CreatorError>;

    async fn apply_configuration(
        &self,
        project_id: u64,
        configuration: &ConfigurationReference,
    ) -> Result<(), CreatorError>;
}

pub struct ProjectCreator<T: ProjectTracker> {
    tracker: T,
    settings: Settings,
}

impl<T: ProjectTracker> ProjectCreator<T> {
    pub fn new(tracker: T, settings: Settings) -> Self {
        ProjectCreator { tracker, settings }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn check_name(&self, name: &str) -> Result<FieldCheck, CreatorError> {
        let index = self.tracker.list_existing_projects().await?;
        Ok(check_name(self.settings.naming_rules, name, &index))
    }

    pub async fn check_code(&self, code: &str, kind: CodeKind) -> Result<FieldCheck, CreatorError> {
        let index = self.tracker.list_existing_projects().await?;
        Ok(check_code(self.settings.naming_rules, code, kind, &index))
    }

    pub async fn resolve_user(&self, username: &str) -> Result<TrackerUser, CreatorError> {
        match self.tracker.find_user(username.trim()).await? {
            Some(user) => Ok(user),
            None => Err(CreatorError::InvalidInput(format!(
                "Could not find user '{}' in ShotGrid database.",
                username
            ))),
        }
    }

    pub async fn session_user(&self, username: &str) -> Result<SessionUser, CreatorError> {
        let user = self.resolve_user(username).await?;
        SessionUser::from_tracker_user(&user)
    }

    /// Resolves a supervisor by name and adds them to the proposal.
    pub async fn add_supervisor(
        &self,
        proposal: &mut ProjectProposal,
        username: &str,
    ) -> Result<TrackerUser, CreatorError> {
        let user = self.tracker.find_user(username.trim()).await?.ok_or_else(|| {
            CreatorError::InvalidInput(
                "Could not find supervisor name in ShotGrid database.".to_string(),
            )
        })?;
        let added = proposal.supervisors.add(user)?;
        log::info!("Added supervisor {} to list", added.name);
        Ok(added.clone())
    }

    /// Validates the proposal against the current remote state, then creates
    /// the project and attaches its pipeline configuration.
    pub async fn submit(
        &self,
        proposal: &ProjectProposal,
        user: &SessionUser,
    ) -> Result<CreatedProject, CreatorError> {
        let configuration = select_configuration_in(
            &self.settings.config_repository,
            proposal.year,
            proposal.is_documentary(),
        )?;
        proposal.check_fps()?;

        let index = self.tracker.list_existing_projects().await?;
        log::debug!("Validating against {} existing projects", index.len());
        let rules = self.settings.naming_rules;
        if let ValidationResult::Rejected(reason) = validate_with(rules, proposal, &index) {
            log::warn!("Proposal {} rejected: {}", proposal.name, reason);
            return Err(rules.to_error(reason, proposal.code_kind));
        }

        if proposal.supervisors.is_empty() {
            return Err(CreatorError::InvalidInput(
                "You haven't yet added any supervisors.".to_string(),
            ));
        }

        for supervisor in proposal.supervisors.iter().filter(|s| s.is_artist()) {
            log::info!("Promoting {} to supervisor", supervisor.name);
            self.tracker.promote_to_supervisor(supervisor).await?;
        }

        let request = NewProject {
            name: proposal.name.clone(),
            code: proposal.normalized_code(),
            supervisors: proposal.supervisors.iter().map(|s| s.id).collect(),
            render_engine: proposal.render_engine,
            project_type: proposal.project_type,
            cohort: user.cohort(),
            fps: proposal.fps,
        };
        let project_id = self.tracker.create_project(&request).await?;
        log::info!("Created project {} with id {}", request.name, project_id);

        if let Err(e) = self
            .tracker
            .apply_configuration(project_id, &configuration)
            .await
        {
            log::error!(
                "Pipeline configuration for project {} failed: {}",
                project_id,
                e
            );
            return Err(CreatorError::PartialFailure {
                project_id,
                message: e.to_string(),
            });
        }

        Ok(CreatedProject {
            id: project_id,
            url: self.settings.project_page_url(project_id),
        })
    }
}
