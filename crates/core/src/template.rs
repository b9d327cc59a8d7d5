#![forbid(unsafe_code)]

//! Two-syntax parameter binding for stored SQL templates.
//!
//! `#{name}` binds a single-quoted literal and `${name}` binds the value verbatim. A missing
//! or empty parameter binds the bare token `null` in both syntaxes. Values are inserted
//! as-is: there is no escaping, so only trusted callers may reach this path.
//!
//! Each syntax is resolved in exactly one pass over the template, quoted first. Text
//! produced by a substitution is never scanned again, by either pass.

use crate::model::ParameterMap;
use regex::Regex;
use std::sync::OnceLock;

const NULL_TOKEN: &str = "null";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Syntax {
    /// `#{name}`
    Quoted,
    /// `${name}`
    Raw,
}

impl Syntax {
    fn pattern(self) -> &'static Regex {
        static QUOTED: OnceLock<Regex> = OnceLock::new();
        static RAW: OnceLock<Regex> = OnceLock::new();
        match self {
            Syntax::Quoted => QUOTED
                .get_or_init(|| Regex::new(r"#\{(.+?)\}").expect("quoted placeholder pattern")),
            Syntax::Raw => {
                RAW.get_or_init(|| Regex::new(r"\$\{(.+?)\}").expect("raw placeholder pattern"))
            }
        }
    }

    fn render(self, value: Option<&str>) -> String {
        match (self, value) {
            (_, None) => NULL_TOKEN.to_string(),
            (Syntax::Quoted, Some(value)) => format!("'{value}'"),
            (Syntax::Raw, Some(value)) => value.to_string(),
        }
    }
}

#[derive(Debug)]
enum Segment<'a> {
    /// Template text still open to later passes.
    Source(&'a str),
    /// Output of a substitution; opaque to every later pass.
    Bound(String),
}

/// Bind `params` into `template`. Pure and deterministic.
pub fn bind(template: &str, params: &ParameterMap) -> String {
    let segments = vec![Segment::Source(template)];
    let segments = substitute(segments, Syntax::Quoted, params);
    let segments = substitute(segments, Syntax::Raw, params);

    let mut out = String::with_capacity(template.len());
    for segment in &segments {
        match segment {
            Segment::Source(text) => out.push_str(text),
            Segment::Bound(text) => out.push_str(text),
        }
    }
    out
}

fn substitute<'a>(
    segments: Vec<Segment<'a>>,
    syntax: Syntax,
    params: &ParameterMap,
) -> Vec<Segment<'a>> {
    let pattern = syntax.pattern();
    let mut out = Vec::with_capacity(segments.len());

    for segment in segments {
        let Segment::Source(text) = segment else {
            out.push(segment);
            continue;
        };

        let mut cursor = 0;
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > cursor {
                out.push(Segment::Source(&text[cursor..whole.start()]));
            }
            let value = params
                .get(name.as_str())
                .map(String::as_str)
                .filter(|v| !v.is_empty());
            out.push(Segment::Bound(syntax.render(value)));
            cursor = whole.end();
        }
        if cursor < text.len() {
            out.push(Segment::Source(&text[cursor..]));
        }
    }

    out
}
