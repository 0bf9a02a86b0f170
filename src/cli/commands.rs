//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::CatalogService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::menu::{preload, run_menu};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    // completion must work without a valid config
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = cli.apply_overrides(Settings::load(cli.config_dir.as_deref())?);
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match &cli.command {
        None => cmd_menu(&container, &[]),
        Some(Commands::Menu { files }) => cmd_menu(&container, files),
        Some(Commands::List { file }) => cmd_list(&container, file.as_deref()),
        Some(Commands::Show { course, file }) => cmd_show(&container, course, file.as_deref()),
        Some(Commands::Tree { file }) => cmd_tree(&container, file.as_deref()),
        Some(Commands::Config { command }) => {
            cmd_config(&container, command, cli.config_dir.as_deref())
        }
        Some(Commands::Completion { .. }) => Ok(()),
    }
}

/// Fresh catalog filled from one file.
fn load_catalog(container: &ServiceContainer, file: Option<&str>) -> CliResult<CatalogService> {
    let mut catalog = container.catalog_service();
    let path = catalog.resolve_path(file);
    let report = catalog.load(&path)?;
    if !report.skipped_lines.is_empty() {
        output::warning(&output::load_summary(&report));
    }
    debug!("{}", output::load_summary(&report));
    Ok(catalog)
}

#[instrument(skip(container))]
fn cmd_menu(container: &ServiceContainer, files: &[String]) -> CliResult<()> {
    let mut catalog = container.catalog_service();
    preload(&mut catalog, files, io::stdout())?;

    let stdin = io::stdin();
    run_menu(&mut catalog, stdin.lock(), io::stdout())
}

#[instrument(skip(container))]
fn cmd_list(container: &ServiceContainer, file: Option<&str>) -> CliResult<()> {
    let catalog = load_catalog(container, file)?;
    for course in catalog.courses() {
        output::info(course);
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_show(container: &ServiceContainer, course: &str, file: Option<&str>) -> CliResult<()> {
    let catalog = load_catalog(container, file)?;
    match catalog.find(course) {
        Some(found) => {
            output::info(&output::course_detail(found));
            Ok(())
        }
        None => Err(CliError::NotFound(course.to_string())),
    }
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, file: Option<&str>) -> CliResult<()> {
    let catalog = load_catalog(container, file)?;
    output::header(&format!(
        "{} course(s), depth {}",
        catalog.len(),
        catalog.index().depth()
    ));
    output::info(&catalog.shape());
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    local_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::warning("global config directory could not be determined"),
            }
            let local = local_config_path(local_dir.unwrap_or(Path::new(".")));
            output::info(&format!("local:  {}", local.display()));
        }
    }
    Ok(())
}
