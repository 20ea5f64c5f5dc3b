//! Command-line argument definitions for the D2 CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input file, the view to print, the
//! output destination, the configuration file and the logging verbosity.

use clap::{Parser, ValueEnum};

/// What `d2-parse` prints for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Emit {
    /// Indented dump of every node and token
    Tree,
    /// One line per diagnostic, with its position
    #[default]
    Diagnostics,
    /// Shapes and edges of the document
    Outline,
}

/// Command-line arguments for the D2 syntax checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input D2 file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// View to print
    #[arg(short, long, value_enum, default_value_t = Emit::Diagnostics)]
    pub emit: Emit,

    /// Path to the output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
