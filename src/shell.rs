//! Line-oriented session loop.
//!
//! Each input line is either a `:command` or a question. A question is fully
//! answered and printed before the next line is read.

use std::{
    io::{BufRead, Write},
    path::Path,
};

use anyhow::Result;
use encoding_rs::Encoding;
use log::warn;
use rand::Rng;

use crate::{io_utils, preview, render, session::Session};

const HELP: &str = "\
Commands:
  :load <path>     upload a CSV file (replaces the current one)
  :columns         list the columns of the current dataset
  :preview [rows]  show the first rows of the current dataset
  :help            show this help
  :quit            end the session
Anything else is answered as a question about the current dataset.";

pub struct ShellOptions {
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub max_rows: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Load(&'a str),
    Columns,
    Preview(usize),
    Help,
    Quit,
    Unknown(&'a str),
    Ask(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Command::Ask(trimmed);
    };
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));
    match name {
        "load" | "upload" if !rest.is_empty() => Command::Load(rest),
        "columns" => Command::Columns,
        "preview" => Command::Preview(rest.parse().unwrap_or(10)),
        "help" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Unknown(trimmed),
    }
}

pub fn run<R, I, W>(
    session: &mut Session<R>,
    input: I,
    output: &mut W,
    options: &ShellOptions,
) -> Result<()>
where
    R: Rng,
    I: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Command::Ask("") => continue,
            Command::Ask(query) => {
                let answer = session.ask(query);
                write!(output, "{}", render::render_answer(&answer, options.max_rows))?;
            }
            Command::Load(path) if io_utils::is_dash(Path::new(path)) => writeln!(
                output,
                "Cannot load from stdin: it is already reading commands. Pass a file path."
            )?,
            Command::Load(path) => {
                match session.load_file(Path::new(path), options.delimiter, options.encoding) {
                    Ok(dataset) => writeln!(
                        output,
                        "Dataset uploaded successfully! {} row(s), {} column(s).",
                        dataset.row_count(),
                        dataset.column_names().len()
                    )?,
                    Err(err) => {
                        warn!("Upload failed: {err:#}");
                        writeln!(output, "Could not load {path}: {err:#}")?;
                    }
                }
            }
            Command::Columns => match session.dataset() {
                Some(dataset) => {
                    for column in dataset.columns() {
                        writeln!(output, "{} ({})", column.name, column.datatype)?;
                    }
                }
                None => writeln!(output, "Please upload a dataset to begin.")?,
            },
            Command::Preview(rows) => match session.dataset() {
                Some(dataset) => write!(output, "{}", preview::preview_table(dataset, rows).render())?,
                None => writeln!(output, "Please upload a dataset to begin.")?,
            },
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Quit => break,
            Command::Unknown(raw) => writeln!(output, "Unknown command '{raw}'. Type :help.")?,
        }
        output.flush()?;
    }
    Ok(())
}
