use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use optspec_core::{OptionParser, ParseResult, ParsedOption, ParserFlags, SpecToken, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for parse results.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "optspec")]
#[command(about = "Parse argument vectors against option declaration files", version)]
struct Cli {
    /// Log parser decisions to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse the arguments after `--` and print the result.
    Parse(ParseArgs),
    /// Validate a declaration file.
    Check(CheckArgs),
    /// Print the help summary for a declaration file.
    Summary(SummaryArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Declaration file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    spec: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Accept options that are not declared.
    #[arg(long)]
    allow_undeclared: bool,
    /// Prefix that negates long options (overrides the declaration file).
    #[arg(long)]
    negation_prefix: Option<String>,
    /// Treat `--` inside the parsed arguments as the end of options.
    #[arg(long)]
    stop_at_double_dash: bool,
    /// Arguments to parse.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Declaration file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Declaration file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    spec: PathBuf,
}

/// Declarations plus parser settings, as read from disk.
///
/// ```yaml
/// allow_undeclared: false
/// negation_prefix: "no"
/// declarations:
///   - ["Input options:"]
///   - [i, input, "[FILE]", "File to read", [REQUIRE_VALUE, REQUIRED]]
///   - [color, "=auto", "Colorize output", [ALLOW_FALSE]]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    allow_undeclared: bool,
    #[serde(default)]
    stop_at_double_dash: bool,
    #[serde(default)]
    negation_prefix: Option<String>,
    declarations: Vec<Vec<SpecToken>>,
}

impl DeclarationFile {
    fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {e}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let file: Self = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| format!("Invalid declaration file '{}': {e}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| format!("Invalid declaration file '{}': {e}", path.display()))?
        };
        debug!(
            path = %path.display(),
            declarations = file.declarations.len(),
            "Loaded declaration file"
        );
        Ok(file)
    }

    fn parser_flags(&self) -> ParserFlags {
        let mut flags = ParserFlags::EMPTY;
        if self.allow_undeclared {
            flags |= ParserFlags::ALLOW_UNDECLARED;
        }
        if self.stop_at_double_dash {
            flags |= ParserFlags::STOP_AT_DOUBLE_DASH;
        }
        flags
    }

    /// Builds a parser over `argv` with every declaration registered.
    fn into_parser(
        self,
        argv: Vec<String>,
        extra: ParserFlags,
    ) -> optspec_core::Result<OptionParser> {
        let mut parser = OptionParser::new(argv, self.parser_flags() | extra);
        if let Some(prefix) = self.negation_prefix {
            parser.set_negation_prefix(prefix);
        }
        parser.declare_all(self.declarations)?;
        Ok(parser)
    }
}

#[derive(Debug, Serialize)]
struct ParseOutput<'a> {
    options: Vec<MatchedOption<'a>>,
    arguments: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct MatchedOption<'a> {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial: Option<char>,
    value: &'a Value,
}

impl<'a> ParseOutput<'a> {
    fn new(result: &'a ParseResult) -> Self {
        Self {
            options: result.matched().map(MatchedOption::new).collect(),
            arguments: result.arguments(),
        }
    }
}

impl<'a> MatchedOption<'a> {
    fn new(option: &'a ParsedOption) -> Self {
        Self {
            key: option.def().key(),
            name: option.name(),
            initial: option.initial(),
            value: option.value(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
        Command::Summary(args) => run_summary(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let file = DeclarationFile::load(&args.spec)?;

    let mut extra = ParserFlags::EMPTY;
    if args.allow_undeclared {
        extra |= ParserFlags::ALLOW_UNDECLARED;
    }
    if args.stop_at_double_dash {
        extra |= ParserFlags::STOP_AT_DOUBLE_DASH;
    }
    let parser = parse_arguments(file, args.args, extra, args.negation_prefix)
        .map_err(|e| e.to_string())?;
    let output = ParseOutput::new(parser.parsed().map_err(|e| e.to_string())?);
    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&output)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            print!("{yaml}");
        }
        CliOutputFormat::Table => print!("{}", format_table(&output)),
    }
    Ok(())
}

/// Declares everything in `file` and parses `argv`, so declaration and
/// argument errors surface through one error type.
fn parse_arguments(
    file: DeclarationFile,
    argv: Vec<String>,
    extra: ParserFlags,
    negation_prefix: Option<String>,
) -> optspec_core::Result<OptionParser> {
    let mut parser = file.into_parser(argv, extra)?;
    if let Some(prefix) = negation_prefix {
        parser.set_negation_prefix(prefix);
    }
    parser.parsed()?;
    Ok(parser)
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let file = DeclarationFile::load(&args.spec)?;
    let parser = file
        .into_parser(Vec::new(), ParserFlags::EMPTY)
        .map_err(|e| e.to_string())?;
    let help_lines = parser
        .registry()
        .entries()
        .len()
        .saturating_sub(parser.registry().len());
    println!(
        "{}: {} option(s), {} help line(s)",
        args.spec.display(),
        parser.registry().len(),
        help_lines
    );
    Ok(())
}

fn run_summary(args: SummaryArgs) -> Result<(), String> {
    let file = DeclarationFile::load(&args.spec)?;
    let parser = file
        .into_parser(Vec::new(), ParserFlags::EMPTY)
        .map_err(|e| e.to_string())?;
    print!("{}", parser.summary());
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Unset => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Text(text) => text.clone(),
        Value::List(items) => items.join(", "),
    }
}

fn format_table(output: &ParseOutput<'_>) -> String {
    let rows: Vec<(String, String)> = output
        .options
        .iter()
        .map(|opt| {
            let spelled = match (opt.name, opt.initial) {
                (Some(name), _) => format!("--{name}"),
                (None, Some(initial)) => format!("-{initial}"),
                (None, None) => opt.key.clone(),
            };
            (spelled, format_value(opt.value))
        })
        .collect();
    let width = rows
        .iter()
        .map(|(left, _)| left.len())
        .chain(std::iter::once("OPTION".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:width$}  VALUE\n", "OPTION");
    for (left, value) in rows {
        out.push_str(&format!("{left:width$}  {value}\n"));
    }
    if !output.arguments.is_empty() {
        out.push_str(&format!("\nARGUMENTS: {}\n", output.arguments.join(" ")));
    }
    out
}
