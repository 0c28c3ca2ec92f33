//! HTML page rendering

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::errors::Result;
use crate::core::models::{Comparison, Direction, EngineOutcome};

const INPUT_TEMPLATE: &str = "input";
const OUTPUT_TEMPLATE: &str = "output";

/// Compiled page templates
pub struct Pages {
    hbs: Handlebars<'static>,
}

#[derive(Serialize)]
struct DirectionChoice {
    label: &'static str,
    description: &'static str,
    checked: bool,
}

#[derive(Serialize)]
struct InputPage<'a> {
    directions: Vec<DirectionChoice>,
    source_text: &'a str,
    errors: &'a BTreeMap<&'static str, Vec<String>>,
}

#[derive(Serialize)]
struct OutputPage<'a> {
    source_text: &'a str,
    source_text_length: u64,
    source_lang: &'a str,
    target_lang: &'a str,
    engines: [&'a EngineOutcome; 2],
}

impl Pages {
    /// Register the built-in templates
    pub fn new() -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.register_partial("header", include_str!("templates/header.hbs"))?;
        hbs.register_partial("footer", include_str!("templates/footer.hbs"))?;
        hbs.register_template_string(INPUT_TEMPLATE, include_str!("templates/input.hbs"))?;
        hbs.register_template_string(OUTPUT_TEMPLATE, include_str!("templates/output.hbs"))?;
        Ok(Self { hbs })
    }

    /// The input form, pre-filled and annotated with field errors
    pub fn input(
        &self,
        selected: Option<&str>,
        source_text: &str,
        errors: &BTreeMap<&'static str, Vec<String>>,
    ) -> Result<String> {
        let directions = Direction::ALL
            .iter()
            .map(|direction| DirectionChoice {
                label: direction.label(),
                description: direction.description(),
                checked: selected == Some(direction.label()),
            })
            .collect();

        Ok(self.hbs.render(
            INPUT_TEMPLATE,
            &InputPage {
                directions,
                source_text,
                errors,
            },
        )?)
    }

    /// Both translations side by side
    pub fn output(&self, comparison: &Comparison) -> Result<String> {
        Ok(self.hbs.render(
            OUTPUT_TEMPLATE,
            &OutputPage {
                source_text: &comparison.source_text,
                source_text_length: comparison.source_text_length,
                source_lang: &comparison.source_lang,
                target_lang: &comparison.target_lang,
                engines: [&comparison.deepl, &comparison.google],
            },
        )?)
    }
}
