//! Attribute-extraction expressions.
//!
//! An expression is evaluated against one HTML element (the scope):
//!
//! | Form | Value |
//! |---|---|
//! | `.` | trimmed text of the scope |
//! | `sel` | trimmed text of the first descendant matching `sel` |
//! | `sel@attr` | `attr` of the first descendant matching `sel` |
//! | `@attr` | `attr` of the scope itself |
//! | `a \|\| b \|\| c` | first non-empty of `a`, `b`, `c` |
//!
//! Expressions are parsed once and evaluated per element.

use std::str::FromStr;

use scraper::{ElementRef, Selector};

use crate::app::{AppError, Result};

#[derive(Debug, Clone)]
enum Term {
    ScopeText,
    SelectorText(Selector),
    ScopeAttr(String),
    SelectorAttr(Selector, String),
}

impl Term {
    fn parse(part: &str) -> Result<Self> {
        if part == "." {
            return Ok(Term::ScopeText);
        }

        match part.split_once('@') {
            Some((selector, attr)) => {
                let attr = attr.trim();
                if attr.is_empty() {
                    return Err(AppError::InvalidSelector(format!(
                        "missing attribute name in {:?}",
                        part
                    )));
                }
                let selector = selector.trim();
                if selector.is_empty() {
                    Ok(Term::ScopeAttr(attr.to_string()))
                } else {
                    Ok(Term::SelectorAttr(parse_selector(selector)?, attr.to_string()))
                }
            }
            None => Ok(Term::SelectorText(parse_selector(part)?)),
        }
    }

    fn evaluate(&self, scope: ElementRef<'_>) -> String {
        match self {
            Term::ScopeText => text_of(scope),
            Term::SelectorText(selector) => scope.select(selector).next().map(text_of).unwrap_or_default(),
            Term::ScopeAttr(attr) => attr_of(scope, attr),
            Term::SelectorAttr(selector, attr) => scope
                .select(selector)
                .next()
                .map(|el| attr_of(el, attr))
                .unwrap_or_default(),
        }
    }
}

/// A parsed extraction expression: an ordered list of alternatives.
#[derive(Debug, Clone)]
pub struct Expression {
    terms: Vec<Term>,
}

impl Expression {
    pub fn parse(expr: &str) -> Result<Self> {
        let terms = expr
            .trim()
            .split("||")
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Term::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { terms })
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the first alternative that yields non-empty text. Later
    /// alternatives are not evaluated once one succeeds.
    pub fn evaluate(&self, scope: ElementRef<'_>) -> String {
        self.terms
            .iter()
            .map(|term| term.evaluate(scope))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }
}

impl FromStr for Expression {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::InvalidSelector(format!("{:?}: {}", selector, e)))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn attr_of(el: ElementRef<'_>, attr: &str) -> String {
    el.value().attr(attr).unwrap_or_default().trim().to_string()
}
