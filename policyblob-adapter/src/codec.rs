//! Line-oriented text encoding of a [`PolicyModel`].
//!
//! One rule per line, `tag, field1, field2, ...`. Permission rules come
//! first, then grouping rules; there is no trailing newline.
//!
//! A field that is empty, has leading or trailing whitespace, or contains
//! `,` or `"` is written in double quotes with inner quotes doubled, so
//! every field the model accepts reads back unchanged.

use crate::error::{AdapterError, AdapterResult};
use crate::model::{PolicyModel, Section};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Field separator used when writing rules.
pub const FIELD_SEPARATOR: &str = ", ";

/// Default line parser.
///
/// Blank lines and `#` comments are ignored and duplicate rules skipped.
/// Unquoted fields are trimmed; quoted fields are taken verbatim.
pub fn load_policy_line(line: &str, model: &mut PolicyModel) -> AdapterResult<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let mut fields = split_fields(line)
        .map_err(|reason| AdapterError::malformed(line, reason))?
        .into_iter();
    let tag = fields.next().unwrap_or_default();
    if tag.is_empty() {
        return Err(AdapterError::malformed(line, "missing rule type"));
    }
    let section = Section::of_tag(&tag)
        .ok_or_else(|| AdapterError::malformed(line, format!("unknown rule type {tag}")))?;
    if !section.accepts(&tag) {
        return Err(AdapterError::malformed(line, format!("invalid rule type {tag}")));
    }

    let rule: Vec<String> = fields.collect();
    if rule.is_empty() {
        return Err(AdapterError::malformed(line, "rule has no fields"));
    }

    model.add_policy(section, &tag, rule);
    Ok(())
}

/// Splits a trimmed line on `,`, honouring double-quoted fields.
fn split_fields(line: &str) -> Result<Vec<String>, &'static str> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut field = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err("unterminated quoted field"),
                }
            }
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            if !matches!(chars.peek(), None | Some(',')) {
                return Err("unexpected text after quoted field");
            }
        } else {
            while let Some(c) = chars.next_if(|c| *c != ',') {
                field.push(c);
            }
            field.truncate(field.trim_end().len());
        }
        fields.push(field);

        // Either the separator or the end of the line.
        if chars.next().is_none() {
            return Ok(fields);
        }
    }
}

/// Reads `reader` line by line, feeding every non-empty trimmed line to
/// `handler`. Stops at the first error; the model may be partially filled.
pub async fn decode<R, F>(reader: R, model: &mut PolicyModel, handler: F) -> AdapterResult<()>
where
    R: AsyncBufRead + Unpin,
    F: Fn(&str, &mut PolicyModel) -> AdapterResult<()>,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        handler(line, model)?;
    }
    Ok(())
}

/// Serializes the whole model. Deterministic for a given in-memory order.
pub fn encode(model: &PolicyModel) -> String {
    let mut buf = String::new();
    for section in [Section::Policy, Section::Grouping] {
        for (ptype, rules) in model.rule_types(section) {
            for rule in rules {
                write_rule(&mut buf, ptype, rule);
            }
        }
    }
    buf.truncate(buf.trim_end_matches('\n').len());
    buf
}

fn write_rule(buf: &mut String, ptype: &str, rule: &[String]) {
    buf.push_str(ptype);
    for field in rule {
        buf.push_str(FIELD_SEPARATOR);
        write_field(buf, field);
    }
    buf.push('\n');
}

fn write_field(buf: &mut String, field: &str) {
    let quoted = field.is_empty() || field.trim() != field || field.contains([',', '"']);
    if !quoted {
        buf.push_str(field);
        return;
    }
    buf.push('"');
    buf.push_str(&field.replace('"', "\"\""));
    buf.push('"');
}
