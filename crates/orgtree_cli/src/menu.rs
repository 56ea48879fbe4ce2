//! Interactive menu loop for the company-units viewer.
//!
//! # Responsibility
//! - Run the Select/Quit console loop over an open family service.
//! - Keep line parsing in pure helpers so the loop stays testable.
//!
//! # Invariants
//! - The integer prompt accepts the exit key (`Q`) as a cancel
//!   sentinel and re-prompts on anything that is not an integer.
//! - EOF on input behaves like Quit on every prompt.

use orgtree_core::{render_family_table, FamilyService, UnitRepository};
use std::io::{self, BufRead, Write};

const EXIT_KEY: &str = "Q";

/// Top-level menu choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Select,
    Quit,
}

/// Outcome of one line read at the integer prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerInput {
    Value(i64),
    Cancelled,
    Invalid,
}

/// Parses one top-level menu line.
pub fn parse_menu_choice(line: &str) -> Option<MenuChoice> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "select" => Some(MenuChoice::Select),
        "q" | "quit" => Some(MenuChoice::Quit),
        _ => None,
    }
}

/// Parses one line of the exit-key-terminated integer prompt.
pub fn parse_integer_input(line: &str) -> IntegerInput {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case(EXIT_KEY) {
        return IntegerInput::Cancelled;
    }
    match trimmed.parse::<i64>() {
        Ok(value) => IntegerInput::Value(value),
        Err(_) => IntegerInput::Invalid,
    }
}

/// Runs the interactive loop until Quit or EOF.
pub fn run_menu<R: UnitRepository>(
    family: &FamilyService<R>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    loop {
        write!(output, "\n[S]elect employee family or [Q]uit: ")?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        match parse_menu_choice(&line) {
            Some(MenuChoice::Quit) => return Ok(()),
            Some(MenuChoice::Select) => select_family(family, input, output)?,
            None => writeln!(output, "ERROR choice must be S or Q")?,
        }
    }
}

fn select_family<R: UnitRepository>(
    family: &FamilyService<R>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    loop {
        write!(
            output,
            "\n(Press [{EXIT_KEY}] to stop operation) Input employee ID: "
        )?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(());
        };
        match parse_integer_input(&line) {
            IntegerInput::Cancelled => return Ok(()),
            IntegerInput::Invalid => {
                writeln!(output, "ERROR employee ID must be an integer")?;
            }
            IntegerInput::Value(id) => {
                match family.family_employees(id) {
                    Ok(units) => write!(output, "\n{}", render_family_table(&units))?,
                    Err(err) => writeln!(
                        output,
                        "ERROR unable to get data from table company_units: {err}"
                    )?,
                }
                return Ok(());
            }
        }
    }
}

fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
