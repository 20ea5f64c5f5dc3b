//! D2 CLI library
//!
//! This module contains the core logic of the `d2-parse` command.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Emit};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use d2::{D2Error, DocumentBuilder, diagnostics::Diagnostic, line_index::LineIndex};

use error_adapter::{DiagnosticAdapter, Reportable};

/// Run the D2 CLI application
///
/// Parses and validates the input file, then writes the view selected by
/// `--emit` to the output file or stdout. The view is written even when the
/// document has errors.
///
/// # Errors
///
/// Returns `D2Error` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Documents with at least one error diagnostic
pub fn run(args: &Args) -> Result<(), D2Error> {
    info!(
        input_path = args.input,
        emit:? = args.emit;
        "Checking document"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DocumentBuilder::new(app_config);
    let parse = builder.analyze(&source);

    let view = match args.emit {
        Emit::Tree => parse.tree().debug_dump(),
        Emit::Diagnostics => format_diagnostics(&args.input, &source, parse.diagnostics()),
        Emit::Outline => builder.outline(&parse).to_string(),
    };
    write_output(args.output.as_deref(), &view)?;

    if parse.has_errors() {
        let (_, diagnostics) = parse.into_parts();
        return Err(D2Error::new_parse_error(diagnostics.into(), source));
    }

    for diagnostic in parse.diagnostics() {
        let reportable = Reportable::Diagnostic(DiagnosticAdapter::new(diagnostic, &source));
        warn!("{}", error_adapter::render(&reportable));
    }

    info!(diagnostics = parse.diagnostics().len(); "Document checked");

    Ok(())
}

/// One `path:line:col: severity[code]: message` line per diagnostic.
fn format_diagnostics(path: &str, source: &str, diagnostics: &[Diagnostic]) -> String {
    let index = LineIndex::new(source);
    diagnostics
        .iter()
        .map(|diagnostic| match diagnostic.span() {
            Some(span) => format!("{path}:{}: {diagnostic}\n", index.line_col(span.start())),
            None => format!("{path}: {diagnostic}\n"),
        })
        .collect()
}

fn write_output(output: Option<&str>, view: &str) -> io::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, view)?;
            info!(output_file = path; "Output written");
            Ok(())
        }
        None => io::stdout().lock().write_all(view.as_bytes()),
    }
}
