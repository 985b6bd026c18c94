//! Composition root for the stage factories
//!
//! A [`Registry`] holds one factory per pipeline stage. It is built once at
//! program start, extended by [`Plugin`]s, and then handed to the loader.

use cfgweave_formats::FormatRegistry;

use crate::aggregation::AggregatorFactory;
use crate::interpolation::InterpolatorFactory;
use crate::parsing::ParserFactory;
use crate::section::SectionSelectorFactory;
use crate::validation::ValidatorFactory;

/// Factories for every pipeline stage.
///
/// # Example
///
/// ```
/// use cfgweave::{Plugin, Registry};
/// use cfgweave_formats::JsonParser;
///
/// struct JsonLines;
///
/// impl Plugin for JsonLines {
///     fn name(&self) -> &str {
///         "jsonl"
///     }
///
///     fn register(&self, registry: &mut Registry) {
///         registry.formats_mut().register(&["jsonl"], JsonParser::new());
///     }
/// }
///
/// let mut registry = Registry::with_builtins();
/// registry.install(&JsonLines);
/// assert!(registry.formats().contains("jsonl"));
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    pub interpolation: InterpolatorFactory,
    pub parsing: ParserFactory,
    pub section: SectionSelectorFactory,
    pub aggregation: AggregatorFactory,
    pub validation: ValidatorFactory,
}

impl Registry {
    /// Registry with every built-in strategy and format.
    pub fn with_builtins() -> Self {
        Self {
            interpolation: InterpolatorFactory::with_builtins(),
            parsing: ParserFactory::with_builtins(),
            section: SectionSelectorFactory::with_builtins(),
            aggregation: AggregatorFactory::with_builtins(),
            validation: ValidatorFactory::with_builtins(),
        }
    }

    /// Let `plugin` add its strategies.
    ///
    /// Install plugins before the first load; nothing stops later
    /// installation, but loaders already built keep their own copy.
    pub fn install(&mut self, plugin: &dyn Plugin) -> &mut Self {
        tracing::debug!(plugin = plugin.name(), "Installing plugin");
        plugin.register(self);
        self
    }

    pub fn formats(&self) -> &FormatRegistry {
        self.parsing.formats()
    }

    pub fn formats_mut(&mut self) -> &mut FormatRegistry {
        self.parsing.formats_mut()
    }

    /// Strategy labels per stage, in resolution order.
    pub fn describe(&self) -> Vec<(&str, Vec<String>)> {
        vec![
            (self.interpolation.name(), self.interpolation.describe()),
            (self.parsing.name(), self.parsing.describe()),
            (self.section.name(), self.section.describe()),
            (self.aggregation.name(), self.aggregation.describe()),
            (self.validation.name(), self.validation.describe()),
        ]
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Extension adding strategies or formats to a [`Registry`].
pub trait Plugin {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut Registry);
}
