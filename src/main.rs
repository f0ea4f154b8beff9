use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use treelox::ast::printer;
use treelox::ast::Stmt;
use treelox::error::CompileError;
use treelox::interpreter::Interpreter;
use treelox::parser::Parser as LoxParser;
use treelox::scanner;

#[derive(Parser, Debug)]
#[command(name = "treelox", about = "A tree-walking Lox interpreter")]
struct Cli {
    /// Source file to run (omit for REPL)
    file: Option<PathBuf>,

    /// Use conventional short-circuit evaluation for 'and'/'or'
    #[arg(long)]
    short_circuit: bool,

    /// Dump tokens (including comments) and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST and exit
    #[arg(long)]
    dump_ast: bool,

    /// AST output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,
}

fn read_source(cli: &Cli) -> Result<(String, String)> {
    match &cli.file {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("read source file '{}'", path.display()))?;
            Ok((source, path.display().to_string()))
        }
        None => bail!("source file required for this operation"),
    }
}

fn report_compile_errors(name: &str, source: &str, errors: Vec<CompileError>) -> anyhow::Error {
    let count = errors.len();
    for e in errors {
        let report = miette::Report::new(e.with_source_code(name, source));
        eprintln!("{report:?}");
    }
    anyhow::anyhow!("{count} error(s)")
}

fn parse_source(name: &str, source: &str) -> Result<Vec<Stmt>> {
    let tokens =
        scanner::scan(source).map_err(|errors| report_compile_errors(name, source, errors))?;
    LoxParser::new(tokens)
        .parse()
        .into_result()
        .map_err(|e| report_compile_errors(name, source, vec![e]))
}

fn run_source(name: &str, source: &str, short_circuit: bool) -> Result<()> {
    let statements = parse_source(name, source)?;
    let mut interpreter = Interpreter::new().with_short_circuit(short_circuit);
    interpreter
        .interpret(&statements)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.dump_tokens {
        let (source, name) = read_source(&cli)?;
        let tokens = scanner::scan_with_comments(&source)
            .map_err(|errors| report_compile_errors(&name, &source, errors))?;
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    if cli.dump_ast {
        let (source, name) = read_source(&cli)?;
        let statements = parse_source(&name, &source)?;
        match cli.ast_format.as_str() {
            "json" => print!("{}", printer::to_json(&statements)),
            _ => print!("{}", printer::to_sexp(&statements)),
        }
        return Ok(());
    }

    match cli.file {
        Some(_) => {
            let (source, name) = read_source(&cli)?;
            run_source(&name, &source, cli.short_circuit)
        }
        None => {
            treelox::repl::run_repl(cli.short_circuit);
            Ok(())
        }
    }
}
