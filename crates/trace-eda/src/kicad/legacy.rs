//! Record-level reader for the line-oriented KiCad legacy formats:
//! symbol libraries (`.lib`) and their documentation files (`.dcm`).
//!
//! This layer only turns text into [`Symbol`] and [`Doc`] records. It never
//! builds connectivity and never validates pin names.

use thiserror::Error;

use crate::{Doc, ElectricalKind, PinAt, PinDescriptor, Shape, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyFileKind {
    Library,
    DocLibrary,
}

impl LegacyFileKind {
    pub fn magic(self) -> &'static str {
        match self {
            LegacyFileKind::Library => "EESchema-LIBRARY",
            LegacyFileKind::DocLibrary => "EESchema-DOCLIB",
        }
    }

    /// Opening and closing markers of one definition block.
    pub fn block_markers(self) -> (&'static str, &'static str) {
        match self {
            LegacyFileKind::Library => ("DEF", "ENDDEF"),
            LegacyFileKind::DocLibrary => ("$CMP", "$ENDCMP"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("not a {kind:?} file: expected header '{expected}', found '{found}'")]
pub struct FormatError {
    pub kind: LegacyFileKind,
    pub expected: &'static str,
    pub found: String,
}

/// A problem inside one definition. Fatal for that definition only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("incomplete pin record ({fields} of 12 fields): '{line}'")]
    IncompletePinRecord { line: String, fields: usize },
    #[error("unknown electrical type '{code}' in pin record '{line}'")]
    UnknownElectricalType { code: String, line: String },
    #[error("invalid {field} '{value}' in pin record '{line}'")]
    InvalidPinField {
        field: &'static str,
        value: String,
        line: String,
    },
    #[error("definition has no DEF line")]
    MissingDefinition,
}

/// A definition block cut out of the file text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    pub text: &'a str,
    /// Byte offset of the block in the source
    pub offset: usize,
}

impl RawBlock<'_> {
    /// 1-based line of the block start in `source`.
    pub fn line_in(&self, source: &str) -> usize {
        source[..self.offset.min(source.len())].matches('\n').count() + 1
    }
}

pub fn check_library_header(text: &str, kind: LegacyFileKind) -> Result<(), FormatError> {
    let expected = kind.magic();
    if text.trim_start_matches('\u{feff}').starts_with(expected) {
        return Ok(());
    }
    Err(FormatError {
        kind,
        expected,
        found: text.lines().next().unwrap_or_default().chars().take(40).collect(),
    })
}

/// Split a record line on whitespace outside double-quoted spans.
///
/// Quoted spans keep their quotes. An unmatched quote swallows the rest of
/// the line into a single token.
pub fn split_record_line(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quote = false;

    for (i, ch) in line.char_indices() {
        if ch == '"' {
            in_quote = !in_quote;
            start.get_or_insert(i);
        } else if ch.is_whitespace() && !in_quote {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
        } else {
            start.get_or_insert(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    tokens
}

/// Find successive `open ... close` blocks, each marker at a line start.
///
/// The scan stops at the first opening marker without a closing marker
/// after it, leaving the remainder unread.
pub fn scan_definitions<'a>(text: &'a str, open: &str, close: &str) -> Vec<RawBlock<'a>> {
    let open_pat = format!("\n{open}");
    let close_pat = format!("\n{close}");
    let mut blocks = Vec::new();
    let mut cursor = 0;

    loop {
        let Some(start) = text[cursor..].find(&open_pat).map(|i| i + cursor + 1) else {
            break;
        };
        let Some(end) = text[cursor..].find(&close_pat).map(|i| i + cursor + 1) else {
            break;
        };
        if end < start {
            break;
        }
        let end = end + close.len();
        blocks.push(RawBlock {
            text: &text[start..end],
            offset: start,
        });
        cursor = end;
    }

    log::trace!("Found {} '{open}' blocks", blocks.len());
    blocks
}

fn unquote(token: &str) -> String {
    token.replace('"', "")
}

/// Interpret one `DEF ... ENDDEF` block.
pub fn parse_symbol_block(block: &str) -> Result<Symbol, RecordError> {
    let mut symbol = Symbol::default();
    let mut saw_def = false;
    let mut lines = block.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let parts = split_record_line(line);
        let Some(&token) = parts.first() else {
            continue;
        };
        let first_value = || parts.get(1).map(|v| unquote(v)).unwrap_or_default();

        match token {
            "DEF" => {
                saw_def = true;
                symbol.name = first_value();
                if let Some(prefix) = parts.get(2) {
                    symbol.reference = unquote(prefix);
                }
            }
            "F0" => symbol.reference = first_value(),
            "F1" => symbol.value = first_value(),
            "F2" => {
                let filter = first_value();
                symbol.footprint_filters = if filter.is_empty() {
                    vec!["*".to_string()]
                } else {
                    vec![filter]
                };
            }
            "F3" => {
                let url = first_value();
                symbol.datasheet = (!url.is_empty() && url != "~").then_some(url);
            }
            "ALIAS" => symbol
                .aliases
                .extend(parts[1..].iter().map(|a| a.to_string())),
            "$FPLIST" => {
                symbol.footprint_filters.clear();
                for entry in lines.by_ref() {
                    if entry.starts_with("$ENDFPLIST") {
                        break;
                    }
                    if !entry.is_empty() {
                        symbol.footprint_filters.push(entry.to_string());
                    }
                }
            }
            "X" => symbol.pins.push(parse_pin_record(line, &parts)?),
            "DRAW" | "ENDDRAW" | "ENDDEF" => {}
            t if t.starts_with('#') => {}
            _ => symbol.shapes.push(Shape {
                tag: token.to_string(),
                args: parts[1..].iter().map(|a| a.to_string()).collect(),
            }),
        }
    }

    if !saw_def {
        return Err(RecordError::MissingDefinition);
    }
    Ok(symbol)
}

/// `X name num x y length orientation name_size num_size unit convert type [style]`
fn parse_pin_record(line: &str, parts: &[&str]) -> Result<PinDescriptor, RecordError> {
    if parts.len() < 12 {
        return Err(RecordError::IncompletePinRecord {
            line: line.to_string(),
            fields: parts.len(),
        });
    }

    let number = |idx: usize, field: &'static str| -> Result<f64, RecordError> {
        parts[idx]
            .parse::<f64>()
            .map_err(|_| RecordError::InvalidPinField {
                field,
                value: parts[idx].to_string(),
                line: line.to_string(),
            })
    };
    let integer = |idx: usize, field: &'static str| -> Result<u32, RecordError> {
        parts[idx]
            .parse::<u32>()
            .map_err(|_| RecordError::InvalidPinField {
                field,
                value: parts[idx].to_string(),
                line: line.to_string(),
            })
    };

    let electrical_kind =
        ElectricalKind::from_code(parts[11]).ok_or_else(|| RecordError::UnknownElectricalType {
            code: parts[11].to_string(),
            line: line.to_string(),
        })?;

    Ok(PinDescriptor {
        name: parts[1].to_string(),
        number: parts[2].to_string(),
        electrical_kind,
        at: PinAt {
            x: number(3, "x")?,
            y: number(4, "y")?,
            orientation: parts[6].to_string(),
        },
        length: number(5, "length")?,
        name_text_size: number(7, "name text size")?,
        number_text_size: number(8, "number text size")?,
        unit: integer(9, "unit")?,
        convert: integer(10, "convert")?,
        style: parts.get(12).map(|s| s.to_string()),
    })
}

/// Interpret one `$CMP ... $ENDCMP` block.
pub fn parse_doc_block(block: &str) -> Doc {
    let mut doc = Doc::default();
    for line in block.lines().map(|l| l.trim_end_matches('\r')) {
        let rest = || line.get(2..).unwrap_or_default().trim_end().to_string();
        match split_record_line(line).first().copied() {
            Some("$CMP") => doc.name = line.get(5..).unwrap_or_default().trim().to_string(),
            Some("D") => doc.description = rest(),
            Some("K") => doc.usage = rest(),
            Some("F") => doc.datasheet_url = rest(),
            _ => {}
        }
    }
    doc
}
