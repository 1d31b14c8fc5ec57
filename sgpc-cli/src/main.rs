use clap::{arg, value_parser, Arg, ArgAction, ArgMatches, Command};
use log::info;

use crate::commands::{
    check_code, check_name, create, show_configuration, whoami, CreateArgs,
};

pub mod commands;

fn cli() -> Command {
    Command::new("sgpc")
        .about("ShotGrid Project Creator - validate and create student projects")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("check-name")
                .about("Checks whether a project name is allowed and still free")
                .arg(arg!(<NAME> "Project name"))
                .arg_required_else_help(true),
        )
        .subcommand(
            Command::new("check-code")
                .about("Checks whether a project code is allowed and still free")
                .arg(arg!(<CODE> "Three-letter code or production code"))
                .arg(arg!(--production "The code is a school production code"))
                .arg_required_else_help(true),
        )
        .subcommand(
            Command::new("configuration")
                .about("Shows the pipeline configuration for a student year")
                .arg(arg!(<YEAR> "Student year (2, 3 or 4)").value_parser(value_parser!(u8)))
                .arg(arg!(--documentary "Documentary project"))
                .arg_required_else_help(true),
        )
        .subcommand(
            Command::new("whoami")
                .about("Resolves the ShotGrid user running the tool")
                .arg(arg!(--user <NAME> "ShotGrid name or login, defaults to the OS login")),
        )
        .subcommand(
            Command::new("create")
                .about("Validates and creates a project with its pipeline configuration")
                .arg(arg!(--name <NAME> "Project name").required(true))
                .arg(arg!(--code <CODE> "Three-letter code or production code").required(true))
                .arg(arg!(--production "The code is a school production code"))
                .arg(arg!(--documentary "Documentary project"))
                .arg(
                    Arg::new("render-engine")
                        .long("render-engine")
                        .value_name("ENGINE")
                        .help("All, Arnold, Karma or RenderMan")
                        .default_value("All"),
                )
                .arg(
                    arg!(--fps <FPS> "Project frame rate")
                        .value_parser(value_parser!(u32))
                        .default_value("25"),
                )
                .arg(
                    arg!(--year <YEAR> "Override the student year derived from the user")
                        .value_parser(value_parser!(u8)),
                )
                .arg(
                    arg!(-s --supervisor <NAME> "Supervisor name or login, repeatable")
                        .action(ArgAction::Append)
                        .required(true),
                )
                .arg(arg!(--user <NAME> "ShotGrid name or login, defaults to the OS login")),
        )
}

fn create_args(sub_matches: &ArgMatches) -> CreateArgs {
    CreateArgs {
        name: sub_matches
            .get_one::<String>("name")
            .cloned()
            .unwrap_or_default(),
        code: sub_matches
            .get_one::<String>("code")
            .cloned()
            .unwrap_or_default(),
        production: sub_matches.get_flag("production"),
        documentary: sub_matches.get_flag("documentary"),
        render_engine: sub_matches
            .get_one::<String>("render-engine")
            .cloned()
            .unwrap_or_else(|| "All".to_string()),
        fps: sub_matches.get_one::<u32>("fps").copied().unwrap_or(25),
        year: sub_matches.get_one::<u8>("year").copied(),
        supervisors: sub_matches
            .get_many::<String>("supervisor")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        user: sub_matches.get_one::<String>("user").cloned(),
    }
}

#[tokio::main]
async fn main() {
    sgpc_lib::config::init();
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
    info!("Logger initialized at log level: {}", log_level);

    let matches = cli().get_matches();

    let result = match matches.subcommand() {
        Some(("check-name", sub_matches)) => {
            let name = sub_matches.get_one::<String>("NAME").cloned().unwrap_or_default();
            check_name(&name).await
        }
        Some(("check-code", sub_matches)) => {
            let code = sub_matches.get_one::<String>("CODE").cloned().unwrap_or_default();
            check_code(&code, sub_matches.get_flag("production")).await
        }
        Some(("configuration", sub_matches)) => {
            let year = sub_matches.get_one::<u8>("YEAR").copied().unwrap_or_default();
            show_configuration(year, sub_matches.get_flag("documentary"))
        }
        Some(("whoami", sub_matches)) => whoami(sub_matches.get_one::<String>("user").cloned()).await,
        Some(("create", sub_matches)) => create(create_args(sub_matches)).await,
        _ => {
            println!("No subcommand was used");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!(
                "Error: {}. Please contact a pipeliner if problem persists.",
                e
            );
            std::process::exit(1);
        }
    }
}
