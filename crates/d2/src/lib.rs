//! D2 - Parsing and checking for the D2 diagram language.
//!
//! This crate ties the scanner, parser and validation pass together behind a
//! [`DocumentBuilder`], and adds document level views: an [`Outline`] of the
//! shapes and edges and a [`TreeCache`] for hosts that reparse often.

pub mod cache;
pub mod config;
pub mod outline;

mod error;

pub use d2_core::{color, identifier, keyword, style};
pub use d2_parser::{Parse, Span, error as diagnostics, line_index, syntax};

pub use cache::TreeCache;
pub use error::D2Error;
pub use outline::Outline;

use std::sync::Arc;

use log::{debug, info, trace};

use d2_parser::validate;

use config::AppConfig;

/// Builder for parsing and checking D2 documents.
///
/// # Examples
///
/// ```rust
/// use d2::{DocumentBuilder, config::AppConfig};
///
/// let source = "client -> server: request\nserver.shape: cylinder";
///
/// // With custom config
/// let builder = DocumentBuilder::new(AppConfig::default());
///
/// // Parse and validate, keeping every diagnostic
/// let parse = builder.analyze(source);
/// assert!(parse.diagnostics().is_empty());
///
/// // Summarise the shapes and edges
/// let outline = builder.outline(&parse);
/// assert_eq!(outline.edges().len(), 1);
///
/// // Or use default config
/// let builder = DocumentBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    config: AppConfig,
    cache: TreeCache,
}

impl DocumentBuilder {
    /// Create a new document builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration selecting the validation checks
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: TreeCache::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse and validate source text.
    ///
    /// The result always holds a tree. Syntax diagnostics come first, then
    /// the diagnostics of the enabled validation checks.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use d2::DocumentBuilder;
    ///
    /// let builder = DocumentBuilder::default();
    /// let parse = builder.analyze("a.style.opacity: 3");
    ///
    /// assert!(parse.has_errors());
    /// assert_eq!(parse.tree().text(), "a.style.opacity: 3");
    /// ```
    pub fn analyze(&self, source: &str) -> Parse {
        info!("Parsing document");

        let mut parse = d2_parser::parse(source);
        debug!(diagnostics = parse.diagnostics().len(); "Document parsed");

        let validation = self.config.validate();
        if validation.is_enabled() {
            let diagnostics = validate::validate(parse.tree(), (*validation).into());
            debug!(diagnostics = diagnostics.len(); "Document validated");
            parse.push_diagnostics(diagnostics);
        }

        trace!(tree:% = parse.tree().debug_dump(); "Syntax tree");
        parse
    }

    /// Like [`analyze`](Self::analyze), but reuses the previous result when
    /// `document` was last analyzed with the same text.
    pub fn analyze_cached(&self, document: &str, source: &str) -> Arc<Parse> {
        self.cache
            .get_or_parse(document, source, |text| self.analyze(text))
    }

    /// Parse and validate source text, failing on any error diagnostic.
    ///
    /// Warnings do not fail the check and stay available on the returned
    /// [`Parse`].
    ///
    /// # Errors
    ///
    /// Returns [`D2Error::Parse`] with every diagnostic and the source text if
    /// any diagnostic has error severity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use d2::{D2Error, DocumentBuilder};
    ///
    /// let builder = DocumentBuilder::default();
    /// assert!(builder.check("a -> b").is_ok());
    ///
    /// let Err(D2Error::Parse { err, .. }) = builder.check("a -> ") else {
    ///     panic!("expected a parse error");
    /// };
    /// assert_eq!(err.diagnostics().len(), 1);
    /// ```
    pub fn check(&self, source: &str) -> Result<Parse, D2Error> {
        let parse = self.analyze(source);
        if !parse.has_errors() {
            return Ok(parse);
        }

        let (_, diagnostics) = parse.into_parts();
        Err(D2Error::new_parse_error(diagnostics.into(), source))
    }

    /// Builds the shape and edge outline of a parsed document.
    pub fn outline(&self, parse: &Parse) -> Outline {
        Outline::from_document(parse.document())
    }

    /// The cache behind [`analyze_cached`](Self::analyze_cached).
    pub fn cache(&self) -> &TreeCache {
        &self.cache
    }
}
