use anyhow::{Context, Result};
use sgpc_lib::{
    config::{get_env_var_or_default, Settings, DEFAULT_CONFIG_REPOSITORY},
    core::{
        configuration::select_configuration_in,
        proposal::{CodeKind, ProjectProposal, RenderEngine},
        ProjectCreator,
    },
    external_services::shotgrid::ShotGridClient,
};

/// Fields of the create form, as given on the command line.
#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub name: String,
    pub code: String,
    pub production: bool,
    pub documentary: bool,
    pub render_engine: String,
    pub fps: u32,
    pub year: Option<u8>,
    pub supervisors: Vec<String>,
    pub user: Option<String>,
}

fn code_kind(production: bool) -> CodeKind {
    if production {
        CodeKind::Production
    } else {
        CodeKind::Mnemonic
    }
}

fn os_username() -> Result<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .context("Could not determine the OS login name, pass --user")
}

fn config_repository() -> String {
    get_env_var_or_default("SHOTGRID_CONFIG_REPOSITORY", DEFAULT_CONFIG_REPOSITORY)
}

async fn connect() -> Result<ProjectCreator<ShotGridClient>> {
    let settings = Settings::from_env()?;
    let client = ShotGridClient::connect(&settings).await?;
    Ok(ProjectCreator::new(client, settings))
}

fn report(ok: bool, message: &str) -> bool {
    if ok {
        println!("{}", message);
    } else {
        eprintln!("{}", message);
    }
    ok
}

pub async fn check_name(name: &str) -> Result<bool> {
    let creator = connect().await?;
    let check = creator.check_name(name).await?;
    Ok(report(check.ok, &check.message))
}

pub async fn check_code(code: &str, production: bool) -> Result<bool> {
    let creator = connect().await?;
    let check = creator.check_code(code, code_kind(production)).await?;
    Ok(report(check.ok, &check.message))
}

pub fn show_configuration(year: u8, documentary: bool) -> Result<bool> {
    let reference = select_configuration_in(&config_repository(), year, documentary)?;
    println!("descriptor: {}", reference.descriptor);
    println!("track: {}", reference.track);
    Ok(true)
}

pub async fn whoami(user: Option<String>) -> Result<bool> {
    let username = match user {
        Some(user) => user,
        None => os_username()?,
    };
    let creator = connect().await?;
    let session = creator.session_user(&username).await?;
    println!("{} (id {})", session.name, session.id);
    println!("Cohort {}, student year {}", session.cohort(), session.student_year);
    Ok(true)
}

pub async fn create(args: CreateArgs) -> Result<bool> {
    let username = match &args.user {
        Some(user) => user.clone(),
        None => os_username()?,
    };
    let render_engine = args.render_engine.parse::<RenderEngine>()?;
    let mut proposal = ProjectProposal::new(
        &args.name,
        &args.code,
        args.year.unwrap_or_default(),
        args.documentary,
    )
    .with_code_kind(code_kind(args.production))
    .with_render_engine(render_engine)
    .with_fps(args.fps);
    proposal.check_fps()?;
    // An explicit year is checked before any ShotGrid traffic.
    if let Some(year) = args.year {
        select_configuration_in(&config_repository(), year, args.documentary)?;
    }

    let creator = connect().await?;
    let session = creator.session_user(&username).await?;
    log::info!(
        "Creating project for {} ({})",
        session.name,
        session.cohort()
    );
    if args.year.is_none() {
        proposal.year = session.year();
        select_configuration_in(&config_repository(), proposal.year, args.documentary)?;
    }

    for supervisor in &args.supervisors {
        let added = creator.add_supervisor(&mut proposal, supervisor).await?;
        println!("Added supervisor {} to list!", added.name);
    }

    println!("Creating project...");
    let created = creator.submit(&proposal, &session).await?;
    println!("Project created: {}", created.url);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgpc_lib::error::CreatorError;

    fn args(year: Option<u8>, fps: u32, render_engine: &str) -> CreateArgs {
        CreateArgs {
            name: "spaceship".to_string(),
            code: "abc".to_string(),
            production: false,
            documentary: false,
            render_engine: render_engine.to_string(),
            fps,
            year,
            supervisors: vec!["jroe".to_string()],
            user: Some("jdoe".to_string()),
        }
    }

    #[test]
    fn production_flag_picks_code_kind() {
        assert_eq!(code_kind(true), CodeKind::Production);
        assert_eq!(code_kind(false), CodeKind::Mnemonic);
    }

    #[test]
    fn configuration_works_offline() {
        assert!(show_configuration(3, false).unwrap());
        assert!(show_configuration(1, false).is_err());
    }

    #[tokio::test]
    async fn unknown_year_fails_before_connecting() {
        let err = create(args(Some(7), 25, "All")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CreatorError>(),
            Some(CreatorError::ConfigurationLookupFailure(_))
        ));
    }

    #[tokio::test]
    async fn bad_form_values_fail_before_connecting() {
        let err = create(args(Some(3), 0, "All")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CreatorError>(),
            Some(CreatorError::InvalidInput(_))
        ));
        let err = create(args(Some(3), 25, "Cycles")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CreatorError>(),
            Some(CreatorError::InvalidInput(_))
        ));
    }
}
