//! Pins and pin names.

use trace_eda::ElectricalKind;

use crate::error::MalformedName;
use crate::session::{ComponentId, NetId, PinId};

/// A pin name split around its single digit run: `~D3N` is inverted,
/// prefix `D`, index 3, postfix `N`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinName {
    pub raw: String,
    /// Name without the inversion marker
    pub clean: String,
    pub prefix: String,
    pub index: Option<u32>,
    pub postfix: String,
    pub is_inverted: bool,
}

impl PinName {
    pub fn parse(raw: &str) -> Result<Self, MalformedName> {
        let malformed = |reason| MalformedName {
            raw: raw.to_string(),
            reason,
        };

        let (is_inverted, clean) = match raw.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let mut runs = Vec::new();
        let mut run_start = None;
        for (i, ch) in clean.char_indices() {
            match (ch.is_ascii_digit(), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    runs.push((start, i));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push((start, clean.len()));
        }

        let (prefix, index, postfix) = match runs.as_slice() {
            [] => (clean, None, ""),
            [(start, end)] => {
                let index = clean[*start..*end]
                    .parse::<u32>()
                    .map_err(|_| malformed("pin number out of range"))?;
                (&clean[..*start], Some(index), &clean[*end..])
            }
            _ => return Err(malformed("more than one number in name")),
        };

        Ok(Self {
            raw: raw.to_string(),
            clean: clean.to_string(),
            prefix: prefix.to_string(),
            index,
            postfix: postfix.to_string(),
            is_inverted,
        })
    }
}

/// Match pins by parts of their parsed name. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinQuery {
    pub prefix: Option<String>,
    pub index: Option<u32>,
    pub postfix: Option<String>,
    pub inverted: Option<bool>,
}

impl PinQuery {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = Some(postfix.into());
        self
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = Some(inverted);
        self
    }

    pub fn matches(&self, name: &PinName) -> bool {
        self.prefix.as_ref().is_none_or(|p| *p == name.prefix)
            && self.index.is_none_or(|i| Some(i) == name.index)
            && self.postfix.as_ref().is_none_or(|p| *p == name.postfix)
            && self.inverted.is_none_or(|inv| inv == name.is_inverted)
    }
}

impl std::fmt::Display for PinQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.inverted == Some(true) {
            write!(f, "~")?;
        }
        write!(f, "{}", self.prefix.as_deref().unwrap_or("*"))?;
        if let Some(index) = self.index {
            write!(f, "{index}")?;
        }
        write!(f, "{}", self.postfix.as_deref().unwrap_or("*"))
    }
}

/// How a caller names a pin on a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSelector {
    /// Clean name, e.g. `"VCC"` or `"RESET"` for `~RESET`
    Name(String),
    /// Library pin number
    Number(String),
    Query(PinQuery),
}

impl PinSelector {
    pub fn matches(&self, pin: &Pin) -> bool {
        match self {
            PinSelector::Name(name) => pin.name.clean == *name,
            PinSelector::Number(number) => pin.number == *number,
            PinSelector::Query(query) => query.matches(&pin.name),
        }
    }
}

impl std::fmt::Display for PinSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinSelector::Name(name) => write!(f, "{name}"),
            PinSelector::Number(number) => write!(f, "#{number}"),
            PinSelector::Query(query) => write!(f, "{query}"),
        }
    }
}

impl From<&str> for PinSelector {
    fn from(name: &str) -> Self {
        PinSelector::Name(name.to_string())
    }
}

impl From<String> for PinSelector {
    fn from(name: String) -> Self {
        PinSelector::Name(name)
    }
}

impl From<u32> for PinSelector {
    fn from(number: u32) -> Self {
        PinSelector::Number(number.to_string())
    }
}

impl From<PinQuery> for PinSelector {
    fn from(query: PinQuery) -> Self {
        PinSelector::Query(query)
    }
}

/// A pin instance, owned by one component.
#[derive(Debug, Clone)]
pub struct Pin {
    pub id: PinId,
    pub component: ComponentId,
    pub number: String,
    pub name: PinName,
    pub kind: ElectricalKind,
    pub(crate) net: Option<NetId>,
    pub error: bool,
}

impl Pin {
    /// The net this pin belongs to, kept in sync with the net's member list.
    pub fn net(&self) -> Option<NetId> {
        self.net
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_indexed_names() {
        let vcc = PinName::parse("VCC").unwrap();
        assert_eq!((vcc.prefix.as_str(), vcc.index, vcc.postfix.as_str()), ("VCC", None, ""));

        let d3 = PinName::parse("D3").unwrap();
        assert_eq!((d3.prefix.as_str(), d3.index, d3.postfix.as_str()), ("D", Some(3), ""));

        let mid = PinName::parse("PA7B").unwrap();
        assert_eq!((mid.prefix.as_str(), mid.index, mid.postfix.as_str()), ("PA", Some(7), "B"));

        let num = PinName::parse("12").unwrap();
        assert_eq!((num.prefix.as_str(), num.index, num.postfix.as_str()), ("", Some(12), ""));
    }

    #[test]
    fn test_inversion_marker() {
        let reset = PinName::parse("~RESET").unwrap();
        assert!(reset.is_inverted);
        assert_eq!(reset.clean, "RESET");
        assert_eq!(reset.raw, "~RESET");

        let unnamed = PinName::parse("~").unwrap();
        assert!(unnamed.is_inverted);
        assert_eq!(unnamed.clean, "");
    }

    #[test]
    fn test_clean_name_round_trips() {
        for raw in ["A", "A1", "1A", "AB2CD", "~CS0", "~", "", "Q", "7", "~WR9X"] {
            let name = PinName::parse(raw).unwrap();
            let index = name.index.map(|i| i.to_string()).unwrap_or_default();
            assert_eq!(name.clean, format!("{}{index}{}", name.prefix, name.postfix), "{raw}");
            assert_eq!(name.is_inverted, raw.starts_with('~'), "{raw}");
        }
    }

    #[test]
    fn test_rejects_multiple_numbers() {
        let err = PinName::parse("A1B2").unwrap_err();
        assert_eq!(err.raw, "A1B2");
        assert!(PinName::parse("VCC_3V3").is_err());
        assert!(PinName::parse("~1A1").is_err());
    }

    #[test]
    fn test_query_matching() {
        let d3 = PinName::parse("D3").unwrap();
        let nd3 = PinName::parse("~D3").unwrap();
        assert!(PinQuery::prefix("D").matches(&d3));
        assert!(PinQuery::prefix("D").with_index(3).matches(&nd3));
        assert!(!PinQuery::prefix("D").with_index(4).matches(&d3));
        assert!(!PinQuery::prefix("D").with_inverted(false).matches(&nd3));
        assert!(PinQuery::default().with_postfix("").matches(&d3));
        assert_eq!(PinQuery::prefix("D").with_index(3).to_string(), "D3*");
    }
}
