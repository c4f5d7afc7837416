//! Field rules and their interpreter
//!
//! Each field is described as data: an anchor element, then a path of navigation steps.
//! A miss at any step leaves only that field empty.

use crate::crawler::parse_selector;
use crate::extract::record::{Field, FirmRecord};
use crate::Result;
use scraper::{ElementRef, Html, Selector};

/// Text an anchor element must carry
#[derive(Debug, Clone, Copy)]
pub enum LabelText {
    Fixed(&'static str),
    /// The configured ranking year
    RankingYear,
}

/// How to find an element
#[derive(Debug, Clone, Copy)]
pub enum Locate {
    /// First element matching the selector
    First(&'static str),
    /// First element matching the selector whose trimmed text equals the label
    Labeled {
        selector: &'static str,
        text: LabelText,
    },
}

/// One navigation step from the current element
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Nearest ancestor matching the selector
    Ancestor(&'static str),
    /// Matching descendant of the current element
    Within(Locate),
    /// Next sibling element matching the selector
    NextSibling(&'static str),
    /// Next matching element in document order
    Following(&'static str),
}

/// Post-processing applied to the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Trim,
    /// Trim, then drop a leading `#`
    Rank,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub anchor: Locate,
    pub path: &'static [Step],
    pub transform: Transform,
}

const RANK_PATH: &[Step] = &[
    Step::Ancestor("div.rankings"),
    Step::Within(Locate::Labeled {
        selector: "p.date-firms",
        text: LabelText::RankingYear,
    }),
    Step::NextSibling("p.rank-firms"),
];

const METRIC_PATH: &[Step] = &[Step::Following("div")];

const fn metric(field: Field, label: &'static str) -> FieldRule {
    FieldRule {
        field,
        anchor: Locate::Labeled {
            selector: "p",
            text: LabelText::Fixed(label),
        },
        path: METRIC_PATH,
        transform: Transform::Trim,
    }
}

/// The profile page layout
pub const FIELD_RULES: [FieldRule; 10] = [
    FieldRule {
        field: Field::FirmName,
        anchor: Locate::First("h1.page-title.left"),
        path: &[],
        transform: Transform::Trim,
    },
    FieldRule {
        field: Field::AmLawRank,
        anchor: Locate::Labeled {
            selector: "p",
            text: LabelText::Fixed("Am Law 200"),
        },
        path: RANK_PATH,
        transform: Transform::Rank,
    },
    FieldRule {
        field: Field::NljRank,
        anchor: Locate::Labeled {
            selector: "p",
            text: LabelText::Fixed("NLJ 500"),
        },
        path: RANK_PATH,
        transform: Transform::Rank,
    },
    metric(Field::EquityPartners, "Equity Partners:"),
    metric(Field::NonEquityPartners, "Non-Equity Partners:"),
    metric(Field::TotalRevenue, "Total Revenue:"),
    metric(Field::ProfitPerPartner, "Profit Per Equity Partner:"),
    metric(Field::RevenuePerLawyer, "Revenue Per Lawyer:"),
    metric(Field::TotalHeadcount, "Total Headcount*:"),
    FieldRule {
        field: Field::Description,
        anchor: Locate::First("p.firms-para"),
        path: &[],
        transform: Transform::Trim,
    },
];

struct CompiledLocate {
    selector: Selector,
    text: Option<String>,
}

impl CompiledLocate {
    fn compile(locate: &Locate, ranking_year: &str) -> Result<Self> {
        let (selector, text) = match locate {
            Locate::First(selector) => (*selector, None),
            Locate::Labeled { selector, text } => {
                let text = match text {
                    LabelText::Fixed(t) => t.to_string(),
                    LabelText::RankingYear => ranking_year.to_string(),
                };
                (*selector, Some(text))
            }
        };

        Ok(Self {
            selector: parse_selector(selector)?,
            text,
        })
    }

    fn accepts(&self, element: &ElementRef<'_>) -> bool {
        match &self.text {
            Some(label) => element_text(element) == *label,
            None => true,
        }
    }

    fn in_document<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.selector).find(|el| self.accepts(el))
    }

    fn within<'a>(&self, element: ElementRef<'a>) -> Option<ElementRef<'a>> {
        element.select(&self.selector).find(|el| self.accepts(el))
    }
}

enum CompiledStep {
    Ancestor(Selector),
    Within(CompiledLocate),
    NextSibling(Selector),
    Following(Selector),
}

impl CompiledStep {
    fn compile(step: &Step, ranking_year: &str) -> Result<Self> {
        Ok(match step {
            Step::Ancestor(s) => Self::Ancestor(parse_selector(s)?),
            Step::Within(locate) => Self::Within(CompiledLocate::compile(locate, ranking_year)?),
            Step::NextSibling(s) => Self::NextSibling(parse_selector(s)?),
            Step::Following(s) => Self::Following(parse_selector(s)?),
        })
    }

    fn apply<'a>(&self, element: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Self::Ancestor(selector) => element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| selector.matches(el)),
            Self::Within(locate) => locate.within(element),
            Self::NextSibling(selector) => element
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|el| selector.matches(el)),
            Self::Following(selector) => next_in_document(element, selector),
        }
    }
}

struct CompiledRule {
    field: Field,
    anchor: CompiledLocate,
    path: Vec<CompiledStep>,
    transform: Transform,
}

/// The field rules with their selectors parsed once
pub struct Extractor {
    rules: Vec<CompiledRule>,
}

impl Extractor {
    /// Compiles `FIELD_RULES` for one ranking year
    pub fn new(ranking_year: &str) -> Result<Self> {
        Self::from_rules(&FIELD_RULES, ranking_year)
    }

    pub fn from_rules(rules: &[FieldRule], ranking_year: &str) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    field: rule.field,
                    anchor: CompiledLocate::compile(&rule.anchor, ranking_year)?,
                    path: rule
                        .path
                        .iter()
                        .map(|step| CompiledStep::compile(step, ranking_year))
                        .collect::<Result<Vec<_>>>()?,
                    transform: rule.transform,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Applies every rule to a parsed page
    pub fn extract(&self, url: &str, document: &Html) -> FirmRecord {
        let mut record = FirmRecord::empty(url);
        for rule in &self.rules {
            let value = evaluate(rule, document);
            if value.is_none() {
                tracing::debug!("{}: no value for '{}'", url, rule.field);
            }
            record.set(rule.field, value);
        }
        record
    }
}

fn evaluate(rule: &CompiledRule, document: &Html) -> Option<String> {
    let mut current = rule.anchor.in_document(document)?;
    for step in &rule.path {
        current = step.apply(current)?;
    }

    let text = element_text(&current);
    let text = match rule.transform {
        Transform::Trim => text.as_str(),
        Transform::Rank => text.trim_start_matches('#').trim(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Finds the first element matching `selector` after `anchor` in document order
///
/// Descendants of `anchor` come first, then its following siblings and their subtrees,
/// then the same for each ancestor in turn.
fn next_in_document<'a>(anchor: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if let Some(found) = anchor.select(selector).next() {
        return Some(found);
    }

    let mut node = *anchor;
    loop {
        for sibling in node.next_siblings() {
            if let Some(element) = ElementRef::wrap(sibling) {
                if selector.matches(&element) {
                    return Some(element);
                }
                if let Some(found) = element.select(selector).next() {
                    return Some(found);
                }
            }
        }
        node = node.parent()?;
    }
}
