use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use docx_quiz::{ImportSource, MarkerPolicy, ParseOptions};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// `{ "questions": [...] }`
    Json,
    /// `Câu k:` / `A.` text form
    Text,
    /// Extracted lines before grouping
    Entries,
}

/// Extract quiz questions from a .docx file or a plain-text file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    input: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    #[arg(long)]
    pretty: bool,

    /// Read the input as plain text, one line per question line
    #[arg(long)]
    text: bool,

    /// Only allowlisted reds mark answers (no "starts with FF" rule)
    #[arg(long)]
    strict_red: bool,

    /// Extra color counted as red, e.g. `#E36C09`
    #[arg(long = "red-color", value_name = "HEX")]
    red_colors: Vec<String>,

    /// Also read footnotes
    #[arg(long)]
    footnotes: bool,

    /// Encode images on the current thread
    #[arg(long)]
    sequential: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            ExitCode::from(2)
        }
    }
}

fn options(cli: &Cli) -> ParseOptions {
    let base = if cli.strict_red {
        MarkerPolicy::strict()
    } else {
        MarkerPolicy::default()
    };
    let markers = cli
        .red_colors
        .iter()
        .fold(base, |policy, hex| policy.with_red_color(hex));
    ParseOptions {
        markers,
        include_footnotes: cli.footnotes,
        parallel_images: !cli.sequential,
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = options(cli);
    let is_text = cli.text
        || cli
            .input
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));

    let source = if is_text {
        let text = std::fs::read_to_string(&cli.input)
            .map_err(|e| format!("{}: {e}", cli.input.display()))?;
        ImportSource::text(text)
    } else {
        let bytes =
            std::fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input.display()))?;
        ImportSource::docx(bytes)
    };

    let rendered = match cli.format {
        Format::Entries => {
            let entries = match (&source.buffer, &source.text) {
                (Some(bytes), _) => {
                    docx_quiz::extract_entries(bytes, &options).map_err(|e| e.to_string())?
                }
                (None, Some(text)) => docx_quiz::text_entries(text),
                (None, None) => Vec::new(),
            };
            to_json(&entries, cli.pretty)?
        }
        Format::Json => {
            let questions = docx_quiz::parse_quiz(&source, &options).map_err(|e| e.to_string())?;
            to_json(&serde_json::json!({ "questions": questions }), cli.pretty)?
        }
        Format::Text => {
            let questions = docx_quiz::parse_quiz(&source, &options).map_err(|e| e.to_string())?;
            for q in questions.iter().filter(|q| !docx_quiz::round_trips(q)) {
                log::warn!("{} will not parse back to the same answers", q.id);
            }
            docx_quiz::to_quiz_text(&questions)
        }
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered).map_err(|e| format!("{}: {e}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").map_err(|e| e.to_string())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, String> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| e.to_string())
}
