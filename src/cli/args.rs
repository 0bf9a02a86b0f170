//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::MalformedLinePolicy;
use crate::config::Settings;
use crate::domain::DuplicatePolicy;

/// In-memory course catalog: load course files, list courses in order, look up a course
#[derive(Parser, Debug)]
#[command(name = "course-catalog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory searched for .course-catalog.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// How to treat a course number that is already loaded
    #[arg(long, global = true, value_enum)]
    pub duplicates: Option<DuplicateArg>,

    /// How to treat a line with fewer than two fields
    #[arg(long, global = true, value_enum)]
    pub on_malformed: Option<MalformedArg>,

    /// Field delimiter of course files
    #[arg(long, global = true)]
    pub delimiter: Option<char>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply command line overrides on top of loaded settings.
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(duplicates) = self.duplicates {
            settings.duplicates = duplicates.into();
        }
        if let Some(on_malformed) = self.on_malformed {
            settings.on_malformed = on_malformed.into();
        }
        if let Some(delimiter) = self.delimiter {
            settings.delimiter = delimiter;
        }
        settings
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu {
        /// Course files to load before the menu starts
        #[arg(value_hint = ValueHint::FilePath)]
        files: Vec<String>,
    },

    /// List all courses in course-number order
    List {
        /// Course file ("default" or omitted: configured default file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<String>,
    },

    /// Show one course and its prerequisites
    Show {
        /// Course number (case-sensitive)
        course: String,
        /// Course file ("default" or omitted: configured default file)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<String>,
    },

    /// Show the structure of the course index
    Tree {
        /// Course file ("default" or omitted: configured default file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented template config
    Template,
    /// Show config file locations
    Path,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateArg {
    Retain,
    Overwrite,
    Reject,
}

impl From<DuplicateArg> for DuplicatePolicy {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Retain => DuplicatePolicy::Retain,
            DuplicateArg::Overwrite => DuplicatePolicy::Overwrite,
            DuplicateArg::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MalformedArg {
    Abort,
    Skip,
}

impl From<MalformedArg> for MalformedLinePolicy {
    fn from(arg: MalformedArg) -> Self {
        match arg {
            MalformedArg::Abort => MalformedLinePolicy::Abort,
            MalformedArg::Skip => MalformedLinePolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_show_with_file_when_parsed_then_fields_set() {
        let cli = Cli::parse_from(["course-catalog", "show", "CSCI200", "-f", "courses.csv"]);
        match cli.command {
            Some(Commands::Show { course, file }) => {
                assert_eq!(course, "CSCI200");
                assert_eq!(file.as_deref(), Some("courses.csv"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_global_overrides_when_applied_then_settings_updated() {
        let cli = Cli::parse_from([
            "course-catalog",
            "list",
            "--duplicates",
            "reject",
            "--on-malformed",
            "skip",
            "--delimiter",
            ";",
            "-dd",
        ]);
        assert_eq!(cli.debug, 2);
        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(settings.duplicates, DuplicatePolicy::Reject);
        assert_eq!(settings.on_malformed, MalformedLinePolicy::Skip);
        assert_eq!(settings.delimiter, ';');
    }

    #[test]
    fn given_no_subcommand_when_parsed_then_command_is_none() {
        let cli = Cli::parse_from(["course-catalog"]);
        assert!(cli.command.is_none());
        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(settings, Settings::default());
    }
}
