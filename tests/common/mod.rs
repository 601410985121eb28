//! # gomacro Test Helpers
//!
//! Thin wrappers over the public pipeline. Every helper goes through
//! [`ExpansionPipeline`] so tests see exactly what the CLI would produce.

#![allow(dead_code)]

use gomacro::engine::{Expansion, ExpansionPipeline};
use gomacro::macros::ExpanderConfig;
use gomacro::ExpandError;

pub fn expand(source: &str) -> String {
    expand_with(source, ExpanderConfig::default())
}

pub fn expand_recursive(source: &str) -> String {
    expand_with(source, ExpanderConfig::default().recursive(true))
}

pub fn expand_with(source: &str, config: ExpanderConfig) -> String {
    match ExpansionPipeline::new(config).expand_to_string("test.go", source) {
        Ok(output) => output,
        Err(e) => panic!("expansion failed: {:?}", miette::Report::new(e)),
    }
}

pub fn expansion(source: &str) -> Expansion {
    match ExpansionPipeline::default().expand_source("test.go", source) {
        Ok(expansion) => expansion,
        Err(e) => panic!("expansion failed: {:?}", miette::Report::new(e)),
    }
}

pub fn expand_err(source: &str) -> ExpandError {
    match ExpansionPipeline::default().expand_source("test.go", source) {
        Ok(expansion) => panic!("expected an error, got {:?}", expansion.program),
        Err(e) => e,
    }
}
