//! The `computo` CLI driver (§6 EXTERNAL INTERFACES, AMBIENT CLI surface).
//!
//! This binary is deliberately thin: it owns argument parsing, file I/O,
//! the REPL loop, and exit-code/diagnostic conventions, and hands the
//! `computo` library everything else. None of this is part of the
//! evaluator's testable properties — it exists to fix the external
//! contract described in §6.

use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use computo::registry::OPERATOR_NAMES;
use computo::sugar::{lexer, parse_sugar, write_sugar};
use computo::{Environment, Options, Value};

mod output;

#[derive(Parser)]
#[command(
    name = "computo",
    version,
    about = "Computo - a homoiconic JSON transformation language",
    after_help = "Example:\n\n\t$ computo --script add.computo inputs.json\n\t$ computo --repl inputs.json"
)]
struct Cli {
    /// Evaluate a script file against zero or more JSON input files
    #[arg(long, value_name = "FILE")]
    script: Option<String>,

    /// Start an interactive read-eval-print loop over the given inputs
    #[arg(long)]
    repl: bool,

    /// Read a file (JSON or sugar) and print its sugar rendering
    #[arg(long, value_name = "FILE")]
    tocomputo: Option<String>,

    /// Read a file (JSON or sugar) and print its JSON AST rendering
    #[arg(long, value_name = "FILE")]
    tojson: Option<String>,

    /// Parse a file and re-emit it through the sugar writer, canonically formatted
    #[arg(long, value_name = "FILE")]
    format: Option<String>,

    /// Tokenize a sugar file and print it back with ANSI syntax highlighting
    #[arg(long, value_name = "FILE")]
    highlight: Option<String>,

    /// Print every registered operator name as a sorted JSON array
    #[arg(long = "list-operators")]
    list_operators: bool,

    /// Permit line/block comments in JSON input files
    #[arg(long)]
    comments: bool,

    /// Override the literal-array disambiguation key (default "array")
    #[arg(long, default_value = "array", value_name = "KEY")]
    array: String,

    /// Force color output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable color output
    #[arg(long = "no-color")]
    no_color: bool,

    /// REPL only: print the evaluation path alongside each result
    #[arg(long)]
    debug: bool,

    /// Input files, read as JSON and exposed as $input / $inputs (for --script/--repl)
    files: Vec<String>,
}

/// Argument-parsing/usage mistakes exit 2; evaluation/runtime errors exit 1
/// (§6: "distinguishing a user argument-mistake exit code from an
/// evaluation error exit code").
const EXIT_USAGE: i32 = 2;
const EXIT_ERROR: i32 = 1;

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("computo: error: {e:#}");
            std::process::exit(exit_code_for(&e));
        }
    }
}

/// Every propagated failure here -- a `computo::Error` from evaluation, or
/// an I/O/parse error wrapped by `anyhow::Context` -- gets the documented
/// exit code 1 (§6). Usage mistakes are reported and exited separately in
/// `run`, before any of this runs, with exit code 2.
fn exit_code_for(_e: &anyhow::Error) -> i32 {
    EXIT_ERROR
}

fn run(cli: Cli) -> Result<()> {
    let modes_selected = [
        cli.script.is_some(),
        cli.repl,
        cli.tocomputo.is_some(),
        cli.tojson.is_some(),
        cli.format.is_some(),
        cli.highlight.is_some(),
        cli.list_operators,
    ]
    .iter()
    .filter(|&&b| b)
    .count();

    if modes_selected != 1 {
        eprintln!("computo: error: exactly one of --script, --repl, --tocomputo, --tojson, --format, --highlight, --list-operators is required");
        eprintln!("Usage: computo --script <FILE> [INPUT_FILES...]");
        std::process::exit(EXIT_USAGE);
    }

    let opts = Options::default().with_array_key(cli.array.clone());

    if cli.list_operators {
        return list_operators();
    }
    if let Some(path) = &cli.tocomputo {
        return convert(path, &opts, cli.comments, Direction::ToSugar);
    }
    if let Some(path) = &cli.tojson {
        return convert(path, &opts, cli.comments, Direction::ToJson);
    }
    if let Some(path) = &cli.format {
        return format_file(path, &opts, cli.comments);
    }
    if let Some(path) = &cli.highlight {
        return highlight_file(path, use_color(&cli));
    }
    if let Some(path) = &cli.script {
        return run_script(path, &cli.files, &opts, cli.comments);
    }
    if cli.repl {
        return run_repl(&cli.files, &opts, cli.comments, cli.debug);
    }
    unreachable!("modes_selected == 1 guarantees one branch above ran");
}

fn use_color(cli: &Cli) -> bool {
    if cli.no_color {
        false
    } else if cli.color {
        true
    } else {
        std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    }
}

fn list_operators() -> Result<()> {
    let mut names: Vec<&str> = OPERATOR_NAMES.to_vec();
    names.sort_unstable();
    let json = serde_json::to_string_pretty(&names)?;
    println!("{json}");
    Ok(())
}

enum Direction {
    ToSugar,
    ToJson,
}

/// `--tocomputo`/`--tojson`: read a file in either notation (auto-detected),
/// parse it, and re-emit through the other converter (§6 SUPPLEMENT).
fn convert(path: &str, opts: &Options, allow_comments: bool, direction: Direction) -> Result<()> {
    let source = read_source_file(path)?;
    let value = parse_auto(&source, opts, allow_comments)?;
    match direction {
        Direction::ToSugar => println!("{}", write_sugar(&value, &opts.array_key)),
        Direction::ToJson => println!("{}", serde_json::to_string_pretty(&value.to_json())?),
    }
    Ok(())
}

fn format_file(path: &str, opts: &Options, allow_comments: bool) -> Result<()> {
    let source = read_source_file(path)?;
    let value = parse_auto(&source, opts, allow_comments)?;
    println!("{}", write_sugar(&value, &opts.array_key));
    Ok(())
}

fn highlight_file(path: &str, color: bool) -> Result<()> {
    let source = read_source_file(path)?;
    let tokens = lexer::lex(&source)?;
    let scheme = if color {
        output::ColorScheme::default_scheme()
    } else {
        output::ColorScheme::none()
    };
    print!("{}", output::highlight(&source, &tokens, &scheme));
    Ok(())
}

fn run_script(script_path: &str, input_paths: &[String], opts: &Options, allow_comments: bool) -> Result<()> {
    let source = read_source_file(script_path)?;
    let script = parse_auto(&source, opts, allow_comments)?;
    let inputs = load_inputs(input_paths, allow_comments)?;
    let env = Environment::new(inputs);
    let result = computo::eval::evaluate(&script, &env, opts)?;
    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(())
}

/// Interactive loop (§6 SUPPLEMENT "REPL mode"): loads the given input
/// files once, then reads successive lines, each evaluated against the
/// same inputs plus whatever `let name = expr` statements prior lines in
/// this session have bound. A bare `let name = expr` (no `in body`) is
/// the REPL's own extension-statement shorthand; anything else is a
/// complete expression evaluated without changing the running frame.
fn run_repl(input_paths: &[String], opts: &Options, allow_comments: bool, debug: bool) -> Result<()> {
    let inputs = load_inputs(input_paths, allow_comments)?;
    let mut env = Environment::new(inputs);

    println!("computo {} -- type an expression, or `let name = expr` to bind a session variable", env!("CARGO_PKG_VERSION"));
    let stdin = std::io::stdin();
    loop {
        print!("computo> ");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, expr_text)) = bare_let_binding(line) {
            match parse_auto(expr_text, opts, allow_comments).and_then(|ast| computo::eval::evaluate_with_path(&ast, &env, opts).map_err(anyhow::Error::from)) {
                Ok((value, path)) => {
                    let mut vars = std::collections::HashMap::new();
                    vars.insert(name.to_string(), value.clone());
                    env = env.with_bindings(vars);
                    print_repl_result(&value, &path, debug);
                }
                Err(e) => eprintln!("computo: error: {e:#}"),
            }
            continue;
        }
        match parse_auto(line, opts, allow_comments).and_then(|ast| computo::eval::evaluate_with_path(&ast, &env, opts).map_err(anyhow::Error::from)) {
            Ok((value, path)) => print_repl_result(&value, &path, debug),
            Err(e) => eprintln!("computo: error: {e:#}"),
        }
    }
}

fn print_repl_result(value: &Value, path: &[String], debug: bool) {
    println!("{}", serde_json::to_string_pretty(&value.to_json()).unwrap_or_default());
    if debug {
        if path.is_empty() {
            println!("  (path: <root>)");
        } else {
            println!("  (path: {})", path.join("."));
        }
    }
}

/// Recognizes the REPL's `let NAME = EXPR` session-binding shorthand,
/// distinct from a full `let NAME = EXPR in BODY` expression (which
/// parses on its own and is evaluated normally, see `run_repl`).
fn bare_let_binding(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("let ")?;
    let eq = rest.find('=')?;
    let name = rest[..eq].trim();
    if name.is_empty() || !name.chars().next().unwrap().is_ascii_alphabetic() && name.chars().next() != Some('_') {
        return None;
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let expr_text = rest[eq + 1..].trim();
    // A full `let ... in ...` expression parses on its own; only treat
    // this as a bare binding when it has no top-level `in`.
    if has_top_level_in(expr_text) {
        return None;
    }
    Some((name, expr_text))
}

/// Whether `text` contains the `in` keyword outside of any bracket/paren
/// nesting and outside string literals -- a cheap lexical check, not a
/// full parse, good enough to distinguish `let x = 1` from
/// `let x = 1 in x + 1`.
fn has_top_level_in(text: &str) -> bool {
    let tokens = match lexer::lex(text) {
        Ok(t) => t,
        Err(_) => return false,
    };
    tokens.iter().any(|t| matches!(t.kind, lexer::TokKind::In))
}

/// Reads `path` as text, surfacing the file path in the error chain.
fn read_source_file(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read file: {path}"))
}

/// Reads `path` as JSON (honoring `--comments`) and loads it as one input
/// value.
fn read_input_file(path: &str, allow_comments: bool) -> Result<Value> {
    let text = read_source_file(path)?;
    let text = if allow_comments { strip_json_comments(&text) } else { text };
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("failed to parse JSON input file: {path}"))?;
    Ok(Value::from_json(json))
}

fn load_inputs(paths: &[String], allow_comments: bool) -> Result<Vec<Value>> {
    paths.iter().map(|p| read_input_file(p, allow_comments)).collect()
}

/// Strips `//` line comments and `/* */` block comments outside of string
/// literals, for JSON input files loaded with `--comments`. This is the
/// loader-level permissiveness described in §6/AMBIENT CONFIGURATION; it
/// has nothing to do with the evaluator itself, which never sees raw text.
fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    while let Some((_, c)) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, c) in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Parses `source` as a Computo script, auto-detecting JSON AST vs. sugar:
/// a strict JSON parse that succeeds wins, otherwise the sugar parser runs
/// (§6 SUPPLEMENT "Format / highlight / ..."). Comments are stripped first
/// when `--comments` is given, matching the JSON loader's permissiveness;
/// the sugar lexer already skips its own `--` line comments regardless.
fn parse_auto(source: &str, opts: &Options, allow_comments: bool) -> Result<Value> {
    let json_candidate = if allow_comments { strip_json_comments(source) } else { source.to_string() };
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&json_candidate) {
        return Ok(Value::from_json(json));
    }
    Ok(parse_sugar(source, &opts.array_key)?)
}
