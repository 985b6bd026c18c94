//! Composed command line overlay reader

use std::fmt;
use std::path::PathBuf;

use cfgweave_core::{Broadcast, FanOut, Flatten, Operator, Stream};
use serde_json::Value;

use crate::constants::{
    DEFAULT_FILE_PREFIX, DEFAULT_KEY_DELIMITER, DEFAULT_KEY_PREFIX, DEFAULT_SECTION_END,
};
use crate::filters::{FileOverlayFilter, KeyValueFilter};
use crate::keypath::{KeyPathBuilder, ValueParser, json_value_parser};
use crate::section::SectionScanner;

/// Overlay grammar settings.
#[derive(Clone)]
pub struct CliOptions {
    /// Token opening the overlay section; `None` opens it at the first token.
    pub section: Option<String>,
    /// Token closing the overlay section; `None` runs it to the end.
    pub section_end: Option<String>,
    pub file_prefix: String,
    pub key_prefix: String,
    pub key_delimiter: String,
    pub value_parser: ValueParser,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            section: None,
            section_end: Some(DEFAULT_SECTION_END.to_string()),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            key_delimiter: DEFAULT_KEY_DELIMITER.to_string(),
            value_parser: json_value_parser(),
        }
    }
}

impl CliOptions {
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.section = Some(name.into());
        self
    }

    pub fn section_end(mut self, end: Option<String>) -> Self {
        self.section_end = end;
        self
    }

    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn key_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.key_delimiter = delimiter.into();
        self
    }

    pub fn value_parser(mut self, parser: ValueParser) -> Self {
        self.value_parser = parser;
        self
    }

    pub fn scanner(&self) -> SectionScanner {
        let end = self.section_end.as_deref();
        match &self.section {
            Some(name) => SectionScanner::named(name, end),
            None => SectionScanner::whole(end),
        }
    }
}

impl fmt::Debug for CliOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliOptions")
            .field("section", &self.section)
            .field("section_end", &self.section_end)
            .field("file_prefix", &self.file_prefix)
            .field("key_prefix", &self.key_prefix)
            .field("key_delimiter", &self.key_delimiter)
            .finish_non_exhaustive()
    }
}

/// Build the reader turning an argument list into overlay fragments.
///
/// File overlays run through `file_pipeline` and come first, in argument
/// order, followed by key overlays in argument order.
pub fn build_cli_reader(
    options: &CliOptions,
    file_pipeline: Operator<PathBuf, Value>,
) -> Operator<Vec<String>, Stream<Value>> {
    let files = Operator::new(FileOverlayFilter::new(options.file_prefix.clone()))
        .then(Broadcast::new(file_pipeline).into_operator());

    let builder = KeyPathBuilder::new(options.key_delimiter.clone(), options.value_parser.clone());
    let keys = Operator::new(KeyValueFilter::new(options.key_prefix.clone()))
        .then(Broadcast::new(Operator::new(builder)).into_operator());

    Operator::new(options.scanner())
        .then(FanOut::new(vec![files, keys]).into_operator())
        .then(Flatten::operator())
}

/// Arguments of the current process, without the program name.
pub fn process_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
