use std::path::PathBuf;

use anyhow::Context;
use apparatus::{Config, Pipeline, default_output_path, storage::xml};
use clap::ArgAction;
use owo_colors::{OwoColorize, colors::css};
use supports_color::Stream;
use tracing::instrument;

/// Convert TEI XML generated by the ITSEE Collation Editor to TEI XML that
/// can be consumed by the open-cbgm library.
///
/// Adds a TEI header with a witness list, removes unnecessary notation for
/// omissions and superfluous <wit> elements, and adds local stemmata without
/// edges.
#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// TEI XML input file to convert.
    input: PathBuf,

    /// Output file (defaults to the input path with `_opencbgm` inserted
    /// before `.xml`).
    #[arg(short = 'o', value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Connectivity value for every variation unit (overrides the
    /// configuration file).
    #[arg(long)]
    connectivity: Option<u32>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.convert()
    }

    #[instrument(skip(self), fields(input = %self.input.display()))]
    fn convert(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(connectivity) = self.connectivity {
            config.set_connectivity(connectivity);
        }

        let output = self
            .output
            .unwrap_or_else(|| default_output_path(&self.input, config.output_suffix()));

        let mut doc = xml::load(&self.input)
            .with_context(|| format!("failed to parse {}", self.input.display()))?;

        let summary = Pipeline::new(config)
            .run(&mut doc)
            .with_context(|| format!("failed to convert {}", self.input.display()))?;

        xml::save(&doc, &output)
            .with_context(|| format!("failed to write {}", output.display()))?;

        println!("{}", Tone::Dim.paint(&summary.to_string(), Stream::Stdout));
        println!(
            "{}",
            Tone::Success.paint(&format!("✅ Wrote {}", output.display()), Stream::Stdout)
        );
        if summary.witnesses == 0 {
            eprintln!(
                "{}",
                Tone::Warning.paint(
                    "⚠️  No witnesses found; the header's witness list is empty",
                    Stream::Stderr
                )
            );
        }
        Ok(())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// How a status line is rendered on a colour terminal.
#[derive(Debug, Clone, Copy)]
enum Tone {
    Success,
    Warning,
    Dim,
}

impl Tone {
    /// Colours `text` for `stream`, or returns it unchanged when the stream
    /// does not support colour.
    fn paint(self, text: &str, stream: Stream) -> String {
        if supports_color::on(stream).is_none() {
            return text.to_string();
        }
        match self {
            Self::Success => text.fg::<css::Green>().to_string(),
            Self::Warning => text.fg::<css::Orange>().to_string(),
            Self::Dim => text.dimmed().to_string(),
        }
    }
}
