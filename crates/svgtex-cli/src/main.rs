use serde::Serialize;
use std::io::Read;
use svgtex::render::{ConvertOptions, convert};
use serde_json::Value;
use svgtex::{ResolvedText, SvgTexConfig, Warning};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    MissingInput(String),
    Io(std::io::Error),
    SvgTex(svgtex::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::MissingInput(path) => write!(f, "Error: {path} not found"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::SvgTex(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<svgtex::Error> for CliError {
    fn from(value: svgtex::Error) -> Self {
        Self::SvgTex(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Tex,
    Extract,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    out: Option<String>,
    background: Option<String>,
    textless_out: Option<String>,
    config: Option<String>,
    strict_transforms: bool,
    include_defs: bool,
    escape_text: bool,
    pretty: bool,
}

#[derive(Serialize)]
struct ExtractOut<'a> {
    width: f64,
    height: f64,
    texts: &'a [ResolvedText],
    warnings: &'a [Warning],
}

fn usage() -> &'static str {
    "svgtex-cli\n\
\n\
USAGE:\n\
  svgtex-cli [tex] [--include|-i <image>] [--textless|-t <svg-out>] [--out <tex-out>] [--strict-transforms] [--include-defs] [--escape-text] [--config <json>] [<svg-in>|-] [<tex-out>]\n\
  svgtex-cli extract [--pretty] [--strict-transforms] [--include-defs] [--config <json>] [<svg-in>|-]\n\
\n\
NOTES:\n\
  - If <svg-in> is omitted or '-', input is read from stdin.\n\
  - tex prints the picture environment to stdout unless <tex-out> or --out is given.\n\
  - --include draws <image> under the text; pair it with the PDF export of the --textless file.\n\
  - The generated picture needs the graphicx and rotating LaTeX packages.\n\
  - Set SVGTEX_LOG (e.g. SVGTEX_LOG=debug) to control diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut positional: Vec<String> = Vec::new();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "tex" | "extract" if !command_seen && positional.is_empty() => {
                command_seen = true;
                args.command = if a == "tex" {
                    Command::Tex
                } else {
                    Command::Extract
                };
            }
            "--pretty" => args.pretty = true,
            "--strict-transforms" => args.strict_transforms = true,
            "--include-defs" => args.include_defs = true,
            "--escape-text" => args.escape_text = true,
            "--include" | "-i" => {
                let Some(image) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if !image.trim().is_empty() {
                    args.background = Some(image.trim().to_string());
                }
            }
            "--textless" | "-t" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.textless_out = Some(out.clone());
            }
            "--out" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--" => positional.extend(it.by_ref().cloned()),
            "-" => positional.push(a.clone()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => positional.push(path.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    args.input = positional.next();
    if let Some(tex_out) = positional.next() {
        if args.out.is_some() || matches!(args.command, Command::Extract) {
            return Err(CliError::Usage(usage()));
        }
        args.out = Some(tex_out);
    }
    if positional.next().is_some() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => {
            if !std::path::Path::new(path).is_file() {
                return Err(CliError::MissingInput(path.to_string()));
            }
            Ok(std::fs::read_to_string(path)?)
        }
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&str>) -> Result<SvgTexConfig, CliError> {
    match path {
        None => Ok(SvgTexConfig::default()),
        Some(path) => {
            if !std::path::Path::new(path).is_file() {
                return Err(CliError::MissingInput(path.to_string()));
            }
            let text = std::fs::read_to_string(path)?;
            Ok(SvgTexConfig::from_json_str(&text)?)
        }
    }
}

/// Command-line flags layered over the config file.
fn layered_config(args: &Args, config: &SvgTexConfig) -> SvgTexConfig {
    let mut config = config.clone();
    if args.strict_transforms {
        config.set_value("transforms.strict", Value::Bool(true));
    }
    if args.include_defs {
        config.set_value("extract.includeDefs", Value::Bool(true));
    }
    if args.escape_text {
        config.set_value("latex.escapeText", Value::Bool(true));
    }
    if let Some(background) = &args.background {
        config.set_value("latex.background", Value::String(background.clone()));
    }
    config
}

/// `SVGTEX_LOG` (a bare level applies to the svgtex crates), then `RUST_LOG`, else `warn`.
fn log_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("SVGTEX_LOG") {
        if level.contains('=') || level.contains(',') {
            return EnvFilter::new(level);
        }
        return EnvFilter::new(format!(
            "warn,svgtex_core={level},svgtex_render={level},svgtex_cli={level}"
        ));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let config = layered_config(&args, &load_config(args.config.as_deref())?);
    let svg = read_input(args.input.as_deref())?;

    match args.command {
        Command::Tex => {
            let options = ConvertOptions {
                textless: args.textless_out.is_some(),
                ..ConvertOptions::from_config(&config)
            };
            let conversion = convert(&svg, &options)?;
            write_text(&conversion.picture, args.out.as_deref())?;
            if let (Some(path), Some(textless)) = (&args.textless_out, &conversion.textless_svg) {
                std::fs::write(path, textless)?;
            }
            tracing::debug!(
                texts = conversion.texts.len(),
                warnings = conversion.warnings.len(),
                "wrote picture"
            );
            Ok(())
        }
        Command::Extract => {
            let options = config.extract_options();
            let prepared = svgtex::prepare(&svg)?;
            let extraction = prepared.extract(&options)?;
            write_json(
                &ExtractOut {
                    width: prepared.dimensions.width,
                    height: prepared.dimensions.height,
                    texts: &extraction.texts,
                    warnings: &extraction.warnings,
                },
                args.pretty,
            )
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging();

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::MissingInput(_)) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
