use anyhow::Result;
use clap::{Parser, Subcommand};
use edgeline_cli::commands::{self, read::ReadOptions, send::SendItem};
use edgeline_cli::{LineArgs, SerialArgs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "edgeline")]
#[command(about = "Edgeline - padded line framing for serial links", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    line: LineArgs,

    #[command(flatten)]
    serial: SerialArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write one padded, terminated line of text
    Line {
        /// Text to send
        #[arg(default_value = "")]
        text: String,

        /// Append to this file instead of the serial port or stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a bare number with no padding or terminator
    Number {
        /// Value to send
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Append to this file instead of the serial port or stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write numbers as one comma-separated line
    Numbers {
        /// Values to send
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Append to this file instead of the serial port or stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a name:value line
    Value {
        /// Stream name (use "" for an unnamed value)
        name: String,

        /// Value to send
        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Append to this file instead of the serial port or stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Frame every line of a text file
    Pack {
        /// Input text file, one payload per line
        #[arg(short, long)]
        input: String,

        /// Append to this file instead of the serial port or stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Split a captured stream or live port into lines
    Read {
        /// Input file ("-" for stdin); defaults to the serial port, then stdin
        #[arg(short, long)]
        input: Option<String>,

        /// Stop after this many lines
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output JSON file for recovered lines
        #[arg(long)]
        json: Option<String>,

        /// Print raw line bytes as hex
        #[arg(long)]
        hex: bool,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the effective line configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries framed output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = cli.line.to_config();
    let serial = &cli.serial;

    // Execute command
    match cli.command {
        Commands::Line { text, output } => {
            commands::send::execute(output.as_deref(), serial, config, &SendItem::Line(text))
        }

        Commands::Number { value, output } => {
            commands::send::execute(output.as_deref(), serial, config, &SendItem::Number(value))
        }

        Commands::Numbers { values, output } => commands::send::execute(
            output.as_deref(),
            serial,
            config,
            &SendItem::Numbers(values),
        ),

        Commands::Value {
            name,
            value,
            output,
        } => commands::send::execute(
            output.as_deref(),
            serial,
            config,
            &SendItem::Value { name, value },
        ),

        Commands::Pack {
            input,
            output,
            progress,
        } => commands::pack::execute(&input, output.as_deref(), serial, config, progress)
            .map(|_| ()),

        Commands::Read {
            input,
            count,
            json,
            hex,
            quiet,
        } => {
            let options = ReadOptions {
                count,
                json,
                hex,
                quiet,
            };
            commands::read::execute(input.as_deref(), serial, config, &options).map(|_| ())
        }

        Commands::Config => commands::config::execute(&config),
    }
}
