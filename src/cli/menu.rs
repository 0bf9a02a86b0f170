//! Interactive menu
//!
//! Reads choices line by line from any `BufRead` and writes to any `Write`,
//! so the loop can be driven from tests as well as from a terminal.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use tracing::{debug, instrument};

use crate::application::services::CatalogService;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output::{course_detail, load_summary, RULE};
use crate::infrastructure::InfraError;

const MENU: &str = "Menu:\n  1. Load Courses\n  2. Display All Courses\n  3. Print Individual Course Information\n  9. Exit";

/// Menu entries by their input number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Load,
    List,
    Show,
    Exit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Choice::Load),
            "2" => Some(Choice::List),
            "3" => Some(Choice::Show),
            "9" => Some(Choice::Exit),
            _ => None,
        }
    }
}

fn write_err(e: io::Error) -> CliError {
    InfraError::io("write menu output", e).into()
}

fn read_err(e: io::Error) -> CliError {
    InfraError::io("read menu input", e).into()
}

/// Load one file and write the outcome; a failed load is reported, not returned.
fn load_reported<W: Write>(catalog: &mut CatalogService, file: &str, output: &mut W) -> CliResult<()> {
    let path = catalog.resolve_path(Some(file));
    writeln!(output, "\n--- Loading file {} ---\n", path.display()).map_err(write_err)?;

    let written = match catalog.load(&path) {
        Ok(report) => writeln!(output, "{} {}\n", "✓".green(), load_summary(&report)),
        Err(e) => {
            debug!("menu: load failed: {}", e);
            writeln!(output, "{}: {}\n", "error".red().bold(), e)
        }
    };
    written.map_err(write_err)
}

struct Menu<'a, R, W> {
    catalog: &'a mut CatalogService,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    /// Next input line without its line ending, `None` at end of input.
    fn read_line(&mut self) -> CliResult<Option<String>> {
        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(read_err)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, msg: &str) -> CliResult<Option<String>> {
        write!(self.output, "{} ", msg.cyan()).map_err(write_err)?;
        self.output.flush().map_err(write_err)?;
        self.read_line()
    }

    fn run(&mut self) -> CliResult<()> {
        writeln!(self.output, "{}\n", "Welcome to the course catalog".bold()).map_err(write_err)?;

        loop {
            writeln!(self.output, "{MENU}").map_err(write_err)?;
            let Some(input) = self.prompt("Enter choice:")? else {
                debug!("menu: end of input");
                break;
            };

            match Choice::parse(&input) {
                Some(Choice::Load) => self.load()?,
                Some(Choice::List) => self.list()?,
                Some(Choice::Show) => self.show()?,
                Some(Choice::Exit) => break,
                None => writeln!(
                    self.output,
                    "\n{}\nPlease enter a number corresponding to the menu's available options.\n",
                    "Invalid choice.".yellow()
                )
                .map_err(write_err)?,
            }
        }

        writeln!(self.output, "\nGood bye.").map_err(write_err)?;
        Ok(())
    }

    fn load(&mut self) -> CliResult<()> {
        let default_token = self.catalog.settings().default_token.clone();
        let msg = format!("\nEnter the file name of the course list to load ({default_token} for the default file):");
        let Some(input) = self.prompt(&msg)? else {
            return Ok(());
        };

        load_reported(self.catalog, &input, &mut self.output)
    }

    fn list(&mut self) -> CliResult<()> {
        writeln!(self.output, "\n{RULE}").map_err(write_err)?;
        if self.catalog.is_empty() {
            writeln!(self.output, "No courses loaded.").map_err(write_err)?;
        }
        for course in self.catalog.courses() {
            writeln!(self.output, "{course}").map_err(write_err)?;
        }
        writeln!(self.output, "{RULE}\n").map_err(write_err)
    }

    fn show(&mut self) -> CliResult<()> {
        let Some(input) = self.prompt("\nEnter the course number to be displayed (case-sensitive):")? else {
            return Ok(());
        };

        let written = match self.catalog.find(&input) {
            Some(course) => writeln!(self.output, "\n{RULE}\n{}\n{RULE}\n", course_detail(course)),
            None => writeln!(
                self.output,
                "\n{}\n",
                "The entered course number was not found.".red()
            ),
        };
        written.map_err(write_err)
    }
}

/// Load `files` before the menu starts, reporting each like the load choice does.
#[instrument(skip(catalog, output))]
pub fn preload<W: Write>(catalog: &mut CatalogService, files: &[String], mut output: W) -> CliResult<()> {
    for file in files {
        load_reported(catalog, file, &mut output)?;
    }
    Ok(())
}

/// Run the interactive menu until the exit choice or end of input.
///
/// Load errors are reported and the loop continues; only I/O failures on
/// `input`/`output` end the menu with an error.
#[instrument(skip_all)]
pub fn run_menu<R: BufRead, W: Write>(
    catalog: &mut CatalogService,
    input: R,
    output: W,
) -> CliResult<()> {
    Menu {
        catalog,
        input,
        output,
    }
    .run()
}
