use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::*;
use crate::cli::output::{CheckJson, format_check};
use crate::context::BoardContext;
use crate::io::config_io::{self, ConfigError};
use crate::model::config::ParserConfig;
use crate::ops::hydrate::StandardHydrator;
use crate::ops::item_ops::load_board;
use crate::parse::board_parser::parse_board;
use crate::parse::board_serializer::serialize_board;

const STDIN: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not encode output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} is not in canonical form")]
    NotCanonical(String),
    #[error("{board}: {count} problem(s) found")]
    Problems { board: String, count: usize },
}

pub fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => config_io::read_config(path)?,
        None => ParserConfig::default(),
    };
    let ctx = BoardContext::new(config)?;

    match cli.command {
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Fmt(args) => cmd_fmt(&ctx, args),
        Commands::Check(args) => cmd_check(&ctx, args),
    }
}

fn cmd_show(ctx: &BoardContext, args: ShowArgs) -> Result<(), CliError> {
    let source = read_input(&args.file)?;
    let board = if args.raw {
        parse_board(ctx, &args.file, &source)
    } else {
        let ctx = ctx.clone().with_hydrator(Arc::new(StandardHydrator::new()));
        futures::executor::block_on(load_board(&ctx, &args.file, &source))
    };
    println!("{}", serde_json::to_string_pretty(&board)?);
    Ok(())
}

fn cmd_fmt(ctx: &BoardContext, args: FmtArgs) -> Result<(), CliError> {
    let source = read_input(&args.file)?;
    let board = parse_board(ctx, &args.file, &source);
    let canonical = serialize_board(&board, ctx.config());

    if args.check {
        if canonical != source {
            return Err(CliError::NotCanonical(args.file));
        }
        return Ok(());
    }
    print!("{}", canonical);
    Ok(())
}

fn cmd_check(ctx: &BoardContext, args: CheckArgs) -> Result<(), CliError> {
    let source = read_input(&args.file)?;
    let board = parse_board(ctx, &args.file, &source);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&CheckJson::new(&board))?);
    } else {
        println!("{}", format_check(&board));
    }

    if board.data.errors.is_empty() {
        Ok(())
    } else {
        Err(CliError::Problems {
            board: board.id,
            count: board.data.errors.len(),
        })
    }
}

fn read_input(file: &str) -> Result<String, CliError> {
    if file == STDIN {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| CliError::Read {
                path: PathBuf::from("<stdin>"),
                source: e,
            })?;
        return Ok(text);
    }
    std::fs::read_to_string(file).map_err(|e| CliError::Read {
        path: PathBuf::from(file),
        source: e,
    })
}
