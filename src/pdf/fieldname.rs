//! Form field-name decomposition
//!
//! Fillable-form generators emit fully-qualified field names like
//! `form1[0].Page1[0].Part2[0].Line1a_FamilyName[0]`. The page/part/line
//! conventions are stable enough to decompose with regexes and regroup the
//! flat field list into a page → part → field hierarchy.

use regex::Regex;
use std::sync::OnceLock;

/// Components recovered from a raw field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFieldName {
    pub raw: String,
    /// `Page3` when a `.Page3[` segment is present
    pub page: Option<String>,
    /// `Part2` when a `.Part2[` segment is present
    pub part: Option<String>,
    /// Last dotted segment with the `[N]` suffix stripped
    pub descriptor: String,
    /// Item number from a `LineN[a-z]?` descriptor prefix, e.g. `1a`
    pub item: Option<String>,
    /// Human-readable tail after the first underscore, e.g. `FamilyName`
    pub description: Option<String>,
}

fn page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.?Page(\d+)\[").unwrap())
}

fn part_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.?Part(\d+)\[").unwrap())
}

fn index_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]$").unwrap())
}

fn item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^Line(\d+[a-z]?)").unwrap())
}

fn description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(.+)$").unwrap())
}

/// Decompose a raw field name into its structural components.
pub fn parse_field_name(raw: &str) -> ParsedFieldName {
    let page = page_re()
        .captures(raw)
        .map(|caps| format!("Page{}", &caps[1]));
    let part = part_re()
        .captures(raw)
        .map(|caps| format!("Part{}", &caps[1]));

    let last_segment = raw.rsplit('.').next().unwrap_or(raw);
    let descriptor = index_suffix_re().replace(last_segment, "").into_owned();

    let item = item_re()
        .captures(&descriptor)
        .map(|caps| caps[1].to_string());
    let description = description_re()
        .captures(&descriptor)
        .map(|caps| caps[1].to_string());

    ParsedFieldName {
        raw: raw.to_string(),
        page,
        part,
        descriptor,
        item,
        description,
    }
}
