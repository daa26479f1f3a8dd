pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod intent;
pub mod io_utils;
pub mod keywords;
pub mod matcher;
pub mod preview;
pub mod render;
pub mod schema;
pub mod session;
pub mod shell;
pub mod suggest;
pub mod table;

use std::{
    env,
    io::{self, Write},
    sync::OnceLock,
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, SessionArgs},
    config::Settings,
    dataset::Dataset,
    session::Session,
    suggest::{OllamaModel, SuggestionModel},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Ask(args) => handle_ask(&args),
        Commands::Shell(args) => handle_shell(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Keywords(args) => handle_keywords(&args),
    }
}

/// Loads settings, applies command-line overrides, and builds a session
/// without a dataset.
pub fn build_session(args: &SessionArgs) -> Result<Session> {
    let mut settings = Settings::load_or_default(args.config.as_deref())?;
    if let Some(host) = &args.llm_host {
        settings.llm.host = host.clone();
    }
    if let Some(model) = &args.llm_model {
        settings.llm.model = model.clone();
    }
    if let Some(timeout) = args.llm_timeout {
        settings.llm.timeout_secs = timeout;
    }
    let model: Option<Box<dyn SuggestionModel>> = if args.no_llm || !settings.llm.enabled {
        debug!("Interpretation model disabled");
        None
    } else {
        let model = OllamaModel::new(&settings.llm)?;
        info!("Using interpretation model {}", model.name());
        Some(Box::new(model))
    };
    Ok(Session::with_seed(settings.keywords, model, args.seed))
}

fn handle_ask(args: &cli::AskArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.session.input_encoding.as_deref())?;
    let mut session = build_session(&args.session)?;
    session
        .load_file(&args.input, args.session.delimiter, encoding)
        .with_context(|| format!("Uploading {:?}", args.input))?;
    if args.preview {
        if let Some(dataset) = session.dataset() {
            println!("## Dataset Preview");
            preview::print_preview(dataset, args.session.max_rows);
        }
    }

    let mut answers = Vec::with_capacity(args.queries.len());
    for query in &args.queries {
        let answer = session.ask(query);
        if !args.json {
            render::print_answer(&answer, args.session.max_rows);
        }
        answers.push(answer);
    }

    if args.json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &answers).context("Writing answers as JSON")?;
        writeln!(handle)?;
    }
    if let Some(path) = &args.chart_out {
        let charts = answers.iter().flat_map(|a| a.charts()).collect::<Vec<_>>();
        render::write_chart_specs(path, &charts)?;
    }
    Ok(())
}

fn handle_shell(args: &cli::ShellArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.session.input_encoding.as_deref())?;
    let mut session = build_session(&args.session)?;
    if let Some(path) = &args.input {
        session
            .load_file(path, args.session.delimiter, encoding)
            .with_context(|| format!("Uploading {path:?}"))?;
    } else {
        println!("Please upload a dataset to begin (:load <path>).");
    }
    let options = shell::ShellOptions {
        delimiter: args.session.delimiter,
        encoding,
        max_rows: args.session.max_rows,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    shell::run(&mut session, stdin.lock(), &mut stdout.lock(), &options)
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dataset = Dataset::load(&args.input, args.delimiter, encoding)
        .with_context(|| format!("Previewing {:?}", args.input))?;
    preview::print_preview(&dataset, args.rows);
    Ok(())
}

fn handle_keywords(args: &cli::KeywordsArgs) -> Result<()> {
    let settings = Settings::load_or_default(args.config.as_deref())?;
    if let Some(chart) = args.chart {
        let phrases = settings
            .keywords
            .phrases(chart)
            .ok_or_else(|| anyhow!("Chart type '{chart}' is not in the keyword table"))?;
        for phrase in phrases {
            println!("{phrase}");
        }
        return Ok(());
    }
    if args.yaml {
        print!("{}", serde_yaml::to_string(&settings.keywords)?);
        return Ok(());
    }
    let rows = settings
        .keywords
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            vec![
                (idx + 1).to_string(),
                entry.chart.to_string(),
                entry.phrases.join(", "),
            ]
        })
        .collect::<Vec<_>>();
    let headers = vec!["#".to_string(), "chart".to_string(), "phrases".to_string()];
    print!("{}", table::render_table(&headers, &rows));
    Ok(())
}
