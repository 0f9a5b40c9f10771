use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;
use tsd_xsd::{ExtractOptions, RenderOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// The XSD document
    Schema,
    /// The extracted element model as JSON
    Model,
}

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// The TypeScript source file
    pub input: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Spaces per nesting level
    #[arg(long, default_value_t = 2, conflicts_with = "tabs")]
    pub indent: usize,

    /// Indent with tabs
    #[arg(long)]
    pub tabs: bool,

    /// Documentation tag marking classes to convert
    #[arg(long, default_value = "schema")]
    pub marker: String,

    /// Only convert marked classes, not interfaces
    #[arg(long)]
    pub no_interfaces: bool,

    /// Only convert declarations with an `export` modifier
    #[arg(long)]
    pub exported_only: bool,

    #[arg(long, value_enum, default_value = "schema")]
    pub emit: Emit,

    /// Fail unless the emitted schema is well-formed XML
    #[arg(long)]
    pub check: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            class_marker: self.marker.trim_start_matches('@').to_string(),
            interfaces: !self.no_interfaces,
            exported_only: self.exported_only,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        if self.tabs {
            RenderOptions::tabs()
        } else {
            RenderOptions::spaces(self.indent)
        }
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
