//! Lexical checks quick-xml leaves to the caller: tag attribute syntax,
//! references, processing instruction targets, and the DOCTYPE name.

use std::collections::HashSet;

use crate::chars::{is_name, is_xml_char, is_xml_whitespace};
use crate::error::MalformedXml;

const PREDEFINED_ENTITIES: [&str; 5] = ["lt", "gt", "amp", "apos", "quot"];

/// Check the attribute list of a tag. `rest` is everything between the
/// element name and the closing `>` (or `/>`).
pub(crate) fn check_attributes(element: &str, rest: &str) -> Result<(), MalformedXml> {
    let bad = |message: String| MalformedXml::Attribute {
        element: element.to_string(),
        message,
    };

    let mut seen = HashSet::new();
    let mut input = rest;
    loop {
        let trimmed = input.trim_start_matches(is_xml_whitespace);
        if trimmed.is_empty() {
            return Ok(());
        }
        if trimmed.len() == input.len() {
            return Err(bad("attributes must be separated by whitespace".into()));
        }

        let name_end = trimmed
            .find(|c: char| is_xml_whitespace(c) || c == '=')
            .unwrap_or(trimmed.len());
        let name = &trimmed[..name_end];
        if !is_name(name) {
            return Err(bad(format!("invalid attribute name {name:?}")));
        }

        let value = trimmed[name_end..]
            .trim_start_matches(is_xml_whitespace)
            .strip_prefix('=')
            .ok_or_else(|| bad(format!("attribute {name} has no value")))?
            .trim_start_matches(is_xml_whitespace);
        let quote = value
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| bad(format!("value of {name} is not quoted")))?;
        let body = &value[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| bad(format!("value of {name} is not terminated")))?;
        let text = &body[..close];

        if text.contains('<') {
            return Err(bad(format!("'<' in value of {name}")));
        }
        check_references(text).map_err(|e| bad(e.to_string()))?;
        if !seen.insert(name) {
            return Err(bad(format!("duplicate attribute {name}")));
        }
        input = &body[close + 1..];
    }
}

/// Every `&` must open a predefined entity or a reference to a legal character.
pub(crate) fn check_references(text: &str) -> Result<(), MalformedXml> {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        let after = &rest[amp + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| MalformedXml::Reference("'&' without a terminating ';'".into()))?;
        check_reference(&after[..end])?;
        rest = &after[end + 1..];
    }
    Ok(())
}

fn check_reference(body: &str) -> Result<(), MalformedXml> {
    let code = if let Some(hex) = body.strip_prefix("#x") {
        parse_code(hex, 16, |c| c.is_ascii_hexdigit())
    } else if let Some(dec) = body.strip_prefix('#') {
        parse_code(dec, 10, |c| c.is_ascii_digit())
    } else if PREDEFINED_ENTITIES.contains(&body) {
        return Ok(());
    } else if is_name(body) {
        return Err(MalformedXml::Reference(format!("undeclared entity &{body};")));
    } else {
        return Err(MalformedXml::Reference(format!("malformed reference &{body};")));
    };

    match code.and_then(char::from_u32) {
        Some(c) if is_xml_char(c) => Ok(()),
        _ => Err(MalformedXml::Reference(format!(
            "&{body}; is not a legal character"
        ))),
    }
}

fn parse_code(digits: &str, radix: u32, is_digit: fn(&char) -> bool) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| is_digit(&c)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

/// `raw` is the instruction body: target, then optional whitespace and data.
pub(crate) fn check_processing_instruction(raw: &str) -> Result<(), MalformedXml> {
    let target = raw.split(is_xml_whitespace).next().unwrap_or_default();
    if !is_name(target) {
        return Err(MalformedXml::ProcessingInstruction(format!(
            "invalid target {target:?}"
        )));
    }
    if target.eq_ignore_ascii_case("xml") {
        return Err(MalformedXml::ProcessingInstruction(format!(
            "target {target:?} is reserved"
        )));
    }
    Ok(())
}

/// `raw` is everything after the `DOCTYPE` keyword.
pub(crate) fn check_doctype(raw: &str) -> Result<(), MalformedXml> {
    let trimmed = raw.trim_start_matches(is_xml_whitespace);
    let end = trimmed
        .find(|c: char| is_xml_whitespace(c) || c == '[' || c == '>')
        .unwrap_or(trimmed.len());
    let name = &trimmed[..end];
    if is_name(name) {
        Ok(())
    } else {
        Err(MalformedXml::InvalidName {
            kind: "document type",
            name: name.to_string(),
        })
    }
}
