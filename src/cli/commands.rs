//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::ensure_rooted;
use crate::application::{ApplicationError, MatchMode};
use crate::cli::args::{Cli, Commands, ConfigCommands, MatchArgs};
use crate::cli::output;
use crate::cli::render::render_tree;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_dir, global_config_path, project_config_path, Settings};
use crate::domain::resolve_mrca;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("determine current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(command, &project_dir),
        Some(command) => {
            let settings = Settings::load(Some(&project_dir))?;
            debug!(?settings, "loaded settings");
            dispatch(command, settings)
        }
        None => Err(CliError::Usage(
            "no command given, see 'mrca --help'".to_string(),
        )),
    }
}

fn dispatch(command: &Commands, mut settings: Settings) -> CliResult<()> {
    match command {
        Commands::Find {
            tree,
            regex,
            matching,
            root_label,
            list_tips,
        } => {
            apply_match_args(&mut settings, matching);
            if let Some(label) = root_label {
                settings.root_label = label.clone();
            }
            cmd_find(&ServiceContainer::new(settings), tree, regex, *list_tips)
        }
        Commands::Tips {
            tree,
            regex,
            matching,
        } => {
            apply_match_args(&mut settings, matching);
            cmd_tips(&ServiceContainer::new(settings), tree, regex)
        }
        Commands::Show {
            tree,
            regex,
            matching,
        } => {
            apply_match_args(&mut settings, matching);
            cmd_show(&ServiceContainer::new(settings), tree, regex.as_deref())
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

/// Command-line flags are the last configuration layer.
fn apply_match_args(settings: &mut Settings, matching: &MatchArgs) {
    if matching.full_match {
        settings.match_mode = MatchMode::Full;
    } else if let Some(mode) = matching.match_mode {
        settings.match_mode = mode;
    }
    if matching.ignore_case {
        settings.ignore_case = true;
    }
}

#[instrument(skip(container))]
fn cmd_find(
    container: &ServiceContainer,
    tree_path: &Path,
    patterns: &[String],
    list_tips: bool,
) -> CliResult<()> {
    let service = container.mrca_service();
    let tree = service.load_tree(tree_path)?;
    let results = service.find_many(&tree, patterns)?;

    for result in &results {
        output::info(result.display_name(&container.settings.root_label));
        if list_tips {
            for tip in &result.tips {
                output::detail(tip);
            }
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tips(container: &ServiceContainer, tree_path: &Path, pattern: &str) -> CliResult<()> {
    let service = container.mrca_service();
    let tree = service.load_tree(tree_path)?;
    let selection = service.select(&tree, pattern)?;

    // Report in tree order rather than set order.
    for tip in tree.tips().into_iter().filter(|tip| selection.contains(tip)) {
        output::info(tree.name(tip).unwrap_or_default());
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_show(
    container: &ServiceContainer,
    tree_path: &Path,
    pattern: Option<&str>,
) -> CliResult<()> {
    let service = container.mrca_service();
    let tree = service.load_tree(tree_path)?;

    let selection = match pattern {
        Some(pattern) => service.select(&tree, pattern)?,
        None => Default::default(),
    };

    // The marker is best effort: an unrooted tree is still worth drawing.
    let mrca = if selection.is_empty() {
        None
    } else {
        match ensure_rooted(&tree).and_then(|_| Ok(resolve_mrca(&tree, &selection)?)) {
            Ok(mrca) => Some(mrca.node),
            Err(e) => {
                output::warning(&format!("MRCA not marked: {e}"));
                None
            }
        }
    };

    output::info(&render_tree(&tree, &selection, mrca));
    if !selection.is_empty() {
        output::detail(&format!(
            "{} tips selected: {}",
            selection.len(),
            tree.tips()
                .into_iter()
                .filter(|tip| selection.contains(tip))
                .filter_map(|tip| tree.name(tip))
                .join(", ")
        ));
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    let fs = RealFileSystem;
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no config directory available)".to_string());
            output::action("global", &global);
            output::action("project", &project_config_path(project_dir).display());
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                let dir = global_config_dir().ok_or_else(|| ApplicationError::Config {
                    message: "no config directory available".to_string(),
                })?;
                fs.create_dir_all(&dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
                dir.join("mrca.toml")
            } else {
                project_config_path(project_dir)
            };
            write_template(&fs, &path)?;
        }
    }
    Ok(())
}

fn write_template(fs: &dyn FileSystem, path: &Path) -> CliResult<()> {
    if fs.exists(path) {
        output::warning(&format!("config already exists: {}", path.display()));
        return Ok(());
    }
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}
