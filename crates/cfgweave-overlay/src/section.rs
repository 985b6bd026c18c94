//! Section scanning over the argument list
//!
//! A section opens at the first token matching the start trigger and closes
//! at the first later token matching the end trigger. Both boundary tokens
//! belong to the section. Once closed, a section never reopens.

use std::iter::FusedIterator;

use cfgweave_core::{Context, Result, Stage};

use crate::constants::DEFAULT_SECTION_END;
use crate::trigger::Trigger;

/// Boundaries of the overlay section.
#[derive(Debug, Clone)]
pub struct SectionScanner {
    start: Trigger,
    end: Trigger,
}

fn end_trigger(end: Option<&str>) -> Trigger {
    end.map_or(Trigger::Never, Trigger::equals)
}

impl SectionScanner {
    pub fn new(start: Trigger, end: Trigger) -> Self {
        Self { start, end }
    }

    /// Section opening at the first token, closed by `end` if given.
    pub fn whole(end: Option<&str>) -> Self {
        Self::new(Trigger::Always, end_trigger(end))
    }

    /// Section opened by a token starting with `name`.
    pub fn named(name: &str, end: Option<&str>) -> Self {
        Self::new(Trigger::prefix(name), end_trigger(end))
    }

    /// Lazily yield the tokens of the section.
    pub fn scan<I>(&self, tokens: I) -> SectionIter<I::IntoIter>
    where
        I: IntoIterator<Item = String>,
    {
        SectionIter {
            tokens: tokens.into_iter(),
            start: self.start.clone(),
            end: self.end.clone(),
            started: false,
            ended: false,
        }
    }
}

impl Default for SectionScanner {
    fn default() -> Self {
        Self::whole(Some(DEFAULT_SECTION_END))
    }
}

impl Stage<Vec<String>, Vec<String>> for SectionScanner {
    fn apply(&self, _ctx: &mut Context, tokens: Vec<String>) -> Result<Vec<String>> {
        Ok(self.scan(tokens).collect())
    }

    fn name(&self) -> &str {
        "cli_section"
    }
}

/// Iterator over the tokens of one section.
#[derive(Debug)]
pub struct SectionIter<I> {
    tokens: I,
    start: Trigger,
    end: Trigger,
    started: bool,
    ended: bool,
}

impl<I> SectionIter<I> {
    pub fn started(&self) -> bool {
        self.started
    }

    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl<I: Iterator<Item = String>> Iterator for SectionIter<I> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.ended {
            return None;
        }
        for token in self.tokens.by_ref() {
            if !self.started {
                if !self.start.matches(&token) {
                    tracing::trace!(%token, "Skipping token before CLI section");
                    continue;
                }
                self.started = true;
                tracing::debug!(%token, "CLI section opened");
            }
            if self.end.matches(&token) {
                self.ended = true;
                tracing::debug!(%token, "CLI section closed");
            }
            return Some(token);
        }
        None
    }
}

impl<I: Iterator<Item = String>> FusedIterator for SectionIter<I> {}
