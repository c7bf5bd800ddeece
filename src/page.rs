//! Reduces the article to the ordered headings and tables the driver scans.

use std::fmt;

use scraper::{ElementRef, Html, Selector};

use crate::context::clean_heading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// `h2`
    Major,
    /// `h3`
    Minor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawElement {
    Heading {
        level: HeadingLevel,
        text: String,
    },
    Table {
        markup: String,
        classes: Vec<String>,
    },
}

impl RawElement {
    pub fn major(text: impl Into<String>) -> Self {
        RawElement::Heading {
            level: HeadingLevel::Major,
            text: text.into(),
        }
    }

    pub fn minor(text: impl Into<String>) -> Self {
        RawElement::Heading {
            level: HeadingLevel::Minor,
            text: text.into(),
        }
    }

    /// only `wikitable`s hold commercials; other tables are layout or navboxes
    pub fn is_data_table(&self) -> bool {
        match self {
            RawElement::Table { classes, .. } => classes.iter().any(|c| c == "wikitable"),
            RawElement::Heading { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// the page has no `#mw-content-text .mw-parser-output` region
    MissingContent,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::MissingContent => {
                f.write_str("could not find main content div (div.mw-parser-output)")
            }
        }
    }
}

impl std::error::Error for StructureError {}

pub struct Page {
    content_sel: Selector,
    element_sel: Selector,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self {
            content_sel: Selector::parse("#mw-content-text div.mw-parser-output").unwrap(),
            element_sel: Selector::parse("h2,h3,table").unwrap(),
        }
    }

    /// Headings and tables of the article body, in document order.
    pub fn elements(&self, html: &Html) -> Result<Vec<RawElement>, StructureError> {
        let content = html
            .select(&self.content_sel)
            .next()
            .ok_or(StructureError::MissingContent)?;
        let elements = content
            .select(&self.element_sel)
            .map(|el| match el.value().name() {
                "h2" => RawElement::major(heading_text(el)),
                "h3" => RawElement::minor(heading_text(el)),
                _ => RawElement::Table {
                    markup: el.html(),
                    classes: el.value().classes().map(str::to_owned).collect(),
                },
            })
            .collect();
        Ok(elements)
    }
}

/// Text pieces are trimmed and glued without a separator, then the edit marker is dropped.
fn heading_text(el: ElementRef<'_>) -> String {
    let joined: String = el.text().map(str::trim).filter(|t| !t.is_empty()).collect();
    clean_heading(&joined)
}
