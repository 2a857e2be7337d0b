// Command-line front end for retrolz.
//
// Subcommands mirror the asset pipeline: `compress` packs a file for the
// target machine, `decompress` unpacks one (mostly for checking), and
// `inspect` lists the token stream of a packed file.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::token::{Token, Tokens};
use crate::codec::{MAX_LITERAL_RUN, MAX_MATCH_LEN, MIN_MATCH_LEN, WINDOW_SIZE};
use crate::io::{self as rio, hex_digest};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// LZ asset compressor for 8-bit targets.
#[derive(Parser, Debug)]
#[command(
    name = "retrolz",
    version,
    about = "LZ asset compressor for 8-bit targets",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a file for the target machine.
    Compress(CompressArgs),
    /// Decompress a packed file.
    Decompress(DecompressArgs),
    /// List the tokens of a packed file.
    Inspect(InspectArgs),
    /// Print format constants and build features.
    Config,
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input file (default: stdin).
    #[arg(long, short = 'd', visible_alias = "data", value_hint = ValueHint::FilePath, conflicts_with = "input_pos")]
    input: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath, conflicts_with = "output_pos")]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Input file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    input_pos: Option<PathBuf>,

    /// Output file (positional form).
    #[arg(value_hint = ValueHint::FilePath)]
    output_pos: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CompressArgs {
    #[command(flatten)]
    io: IoArgs,
}

#[derive(Args, Debug)]
struct DecompressArgs {
    #[command(flatten)]
    io: IoArgs,

    /// Refuse to produce more than this many bytes (supports K/M/G suffix).
    #[arg(long = "max-output", value_parser = parse_byte_size)]
    max_output: Option<u64>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Packed input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Inspect,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    max_output: Option<usize>,
}

impl Options {
    fn new(command: Command, cli: &Cli) -> Self {
        Self {
            command,
            use_stdout: false,
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            json_output: cli.json_output,
            input_file: None,
            output_file: None,
            max_output: None,
        }
    }

    fn with_io(mut self, io: IoArgs) -> Self {
        self.use_stdout = io.stdout;
        self.input_file = io.input.or(io.input_pos);
        self.output_file = io.output.or(io.output_pos);
        self
    }
}

fn resolve_options(mut cli: Cli) -> Options {
    let command = std::mem::replace(&mut cli.command, Cmd::Config);
    match command {
        Cmd::Compress(args) => Options::new(Command::Compress, &cli).with_io(args.io),
        Cmd::Decompress(args) => {
            let mut opts = Options::new(Command::Decompress, &cli).with_io(args.io);
            opts.max_output = args
                .max_output
                .map(|n| usize::try_from(n).unwrap_or(usize::MAX));
            opts
        }
        Cmd::Inspect(args) => {
            let mut opts = Options::new(Command::Inspect, &cli);
            opts.input_file = Some(args.input);
            opts
        }
        Cmd::Config => Options::new(Command::Config, &cli),
    }
}

/// Default log filter for the `-q` / `-v` flags.
fn log_filter(quiet: bool, verbose: u8) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("retrolz".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared input/output plumbing
// ---------------------------------------------------------------------------

fn read_input(opts: &Options) -> Result<Vec<u8>, String> {
    let mut reader: Box<dyn Read> = match &opts.input_file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::with_capacity(BUF_SIZE, f)),
            Err(e) => return Err(format!("input file: {}: {e}", path.display())),
        },
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| format!("read error: {e}"))?;
    Ok(data)
}

fn check_output(opts: &Options) -> Result<(), String> {
    if let Some(path) = &opts.output_file
        && path.exists()
        && !opts.force
    {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    Ok(())
}

fn write_output(opts: &Options, data: &[u8]) -> Result<(), String> {
    let mut writer: Box<dyn Write> = match &opts.output_file {
        None => Box::new(BufWriter::with_capacity(BUF_SIZE, io::stdout().lock())),
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(BufWriter::with_capacity(BUF_SIZE, f)),
            Err(e) => return Err(format!("output file: {}: {e}", path.display())),
        },
    };
    writer
        .write_all(data)
        .and_then(|()| writer.flush())
        .map_err(|e| format!("write error: {e}"))?;
    if let Some(path) = &opts.output_file {
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn display_name(path: Option<&Path>) -> String {
    path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}

fn print_json(value: &serde_json::Value) {
    eprintln!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// ---------------------------------------------------------------------------
// Compress command
// ---------------------------------------------------------------------------

fn cmd_compress(opts: &Options) -> i32 {
    if let Err(e) = check_output(opts) {
        eprintln!("retrolz: {e}");
        return 1;
    }
    let input = match read_input(opts) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("retrolz: {e}");
            return 1;
        }
    };

    let mut packed = Vec::new();
    let stats = match rio::compress_stream(Cursor::new(&input), &mut packed) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("retrolz: compress error: {e}");
            return 1;
        }
    };

    if let Err(e) = write_output(opts, &packed) {
        eprintln!("retrolz: {e}");
        return 1;
    }

    log::info!(
        "compressed {} from {} to {} bytes ({:.1}%)",
        display_name(opts.input_file.as_deref()),
        stats.input_size,
        stats.output_size,
        stats.ratio() * 100.0
    );

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "compress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "ratio": stats.ratio(),
            "literal_runs": stats.literal_runs,
            "backrefs": stats.backrefs,
            "sha256": stats.input_sha256.map(|d| hex_digest(&d)),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Decompress command
// ---------------------------------------------------------------------------

fn cmd_decompress(opts: &Options) -> i32 {
    if let Err(e) = check_output(opts) {
        eprintln!("retrolz: {e}");
        return 1;
    }
    let input = match read_input(opts) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("retrolz: {e}");
            return 1;
        }
    };

    let mut unpacked = Vec::new();
    let stats = match rio::decompress_stream(Cursor::new(&input), &mut unpacked, opts.max_output)
    {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!(
                "retrolz: {}: {e}",
                display_name(opts.input_file.as_deref())
            );
            return 1;
        }
    };

    if let Err(e) = write_output(opts, &unpacked) {
        eprintln!("retrolz: {e}");
        return 1;
    }

    log::info!(
        "decompressed {} from {} to {} bytes",
        display_name(opts.input_file.as_deref()),
        stats.input_size,
        stats.output_size
    );

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "decompress",
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "sha256": stats.output_sha256.map(|d| hex_digest(&d)),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(path) = &opts.input_file else {
        eprintln!("retrolz: inspect requires an input file");
        return 1;
    };
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("retrolz: {}: {e}", path.display());
            return 1;
        }
    };

    let mut tokens = Tokens::new(&data);
    let mut position = 0usize;
    let mut literal_runs = 0usize;
    let mut literal_bytes = 0usize;
    let mut backrefs = 0usize;
    let mut copied_bytes = 0usize;

    println!("  Offset Kind   Len  Dist    @Out");
    loop {
        let offset = tokens.offset();
        let token = match tokens.next() {
            Some(Ok(token)) => token,
            Some(Err(e)) => {
                eprintln!("retrolz: {}: {e}", path.display());
                return 1;
            }
            None => break,
        };
        match token {
            Token::Literal(bytes) => {
                println!("  {offset:06} LIT  {:5}       {position:7}", bytes.len());
                literal_runs += 1;
                literal_bytes += bytes.len();
            }
            Token::BackRef { len, distance } => {
                if distance > position {
                    eprintln!(
                        "retrolz: {}: back-reference at offset {offset} reaches before start of output",
                        path.display()
                    );
                    return 1;
                }
                println!("  {offset:06} CPY  {len:5} {distance:5} {position:7}");
                backrefs += 1;
                copied_bytes += len;
            }
        }
        position += token.output_len();
    }

    println!();
    println!("Compressed size:      {}", data.len());
    println!("Decompressed size:    {position}");
    println!("Literal runs:         {literal_runs} ({literal_bytes} bytes)");
    println!("Back-references:      {backrefs} ({copied_bytes} bytes)");
    let trailing = tokens.trailing().len();
    if trailing > 0 {
        println!("Trailing bytes:       {trailing}");
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "inspect",
            "input_size": data.len(),
            "output_size": position,
            "literal_runs": literal_runs,
            "literal_bytes": literal_bytes,
            "backrefs": backrefs,
            "copied_bytes": copied_bytes,
            "trailing_bytes": trailing,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("retrolz version {version}");

    let file_io = cfg!(feature = "file-io") as u8;

    eprintln!("FILE_IO={file_io}");
    eprintln!("WINDOW_SIZE={WINDOW_SIZE}");
    eprintln!("MAX_LITERAL_RUN={MAX_LITERAL_RUN}");
    eprintln!("MIN_MATCH_LEN={MIN_MATCH_LEN}");
    eprintln!("MAX_MATCH_LEN={MAX_MATCH_LEN}");

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(opts.quiet, opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    if opts.use_stdout
        && let Some(path) = opts.output_file.take()
    {
        log::warn!("-c option overrides output filename: {}", path.display());
    }

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
