//! Choosing footprints for components from their parts' filter patterns.

use std::collections::{HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::session::{ComponentId, FootprintId, PartId, Session};

/// Translate a footprint filter glob into a regex anchored at the start.
///
/// `?` matches one character and `*` any run; everything else is literal.
/// The end is left open, so `SOIC-8` also accepts `SOIC-8_3.9x4.9mm`.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    RegexBuilder::new(&re).case_insensitive(true).build()
}

/// A component left without a footprint by auto-assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no footprint for {reference} matches filters {filters:?}")]
pub struct AutoAssignmentMiss {
    pub reference: String,
    pub filters: Vec<String>,
}

/// Candidate footprints per part, computed once per part.
///
/// The cache is not invalidated when footprints are added later.
#[derive(Debug, Default)]
pub struct FootprintMatcher {
    cache: HashMap<PartId, Vec<FootprintId>>,
}

impl FootprintMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Footprints whose pad count equals the part's pin count and whose
    /// name (or `group:name`) matches one of the part's filters, in
    /// registration order.
    pub fn candidates(&mut self, catalog: &Catalog, part: PartId) -> &[FootprintId] {
        self.cache
            .entry(part)
            .or_insert_with(|| compute_candidates(catalog, part))
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn compute_candidates(catalog: &Catalog, part: PartId) -> Vec<FootprintId> {
    let part = catalog.part(part);
    let pin_count = part.pin_count();

    let patterns: Vec<Regex> = part
        .symbol
        .footprint_filters
        .iter()
        .filter_map(|f| match glob_to_regex(f) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Ignoring footprint filter '{f}' of {}: {e}", part.identifier);
                None
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let found: Vec<FootprintId> = catalog
        .footprints()
        .filter(|(_, fp)| fp.pad_count == pin_count)
        .filter(|(_, fp)| {
            let qualified = fp.qualified_name();
            patterns
                .iter()
                .any(|re| re.is_match(&fp.name) || re.is_match(&qualified))
        })
        .map(|(id, _)| id)
        .filter(|id| seen.insert(*id))
        .collect();

    log::trace!("{}: {} footprint candidates", part.identifier, found.len());
    found
}

/// Give each listed component without a footprint the first candidate of
/// its part. Components with no candidate are logged and returned; the rest
/// are still assigned.
pub fn auto_assign(session: &mut Session, components: &[ComponentId]) -> Vec<AutoAssignmentMiss> {
    let mut misses = Vec::new();
    for &id in components {
        if session.component(id).footprint.is_some() {
            continue;
        }
        let part = session.component(id).part;
        let first = session.candidates(part).first().copied();
        match first {
            Some(fp) => {
                log::debug!(
                    "{} -> {}",
                    session.component(id).reference,
                    session.catalog().footprint(fp).qualified_name()
                );
                session.component_mut(id).footprint = Some(fp);
            }
            None => {
                let miss = AutoAssignmentMiss {
                    reference: session.component(id).reference.clone(),
                    filters: session.catalog().part(part).symbol.footprint_filters.clone(),
                };
                log::warn!("{miss}");
                misses.push(miss);
            }
        }
    }
    misses
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_test_utils::LibrarySandbox;

    #[test]
    fn glob_translation() {
        let re = glob_to_regex("SOIC*3.9x4.9mm*").unwrap();
        assert!(re.is_match("SOIC-8_3.9x4.9mm_P1.27mm"));
        assert!(re.is_match("soic-8_3.9X4.9MM"));
        assert!(!re.is_match("Package_SO:TSSOP-8"));

        let re = glob_to_regex("TO?92*").unwrap();
        assert!(re.is_match("TO-92_Inline"));
        assert!(!re.is_match("TO92"));

        // Regex metacharacters are literal
        let re = glob_to_regex("R(1)+").unwrap();
        assert!(re.is_match("R(1)+x"));
        assert!(!re.is_match("R11"));
    }

    fn fixture_catalog(sb: &LibrarySandbox) -> Catalog {
        let mut catalog = Catalog::new(vec![sb.library_dir().to_path_buf()]);
        catalog.load_footprints(sb.footprint_dir()).unwrap();
        catalog
    }

    fn candidate_names(catalog: &Catalog, ids: &[FootprintId]) -> Vec<String> {
        ids.iter().map(|id| catalog.footprint(*id).name.clone()).collect()
    }

    #[test]
    fn soic_filter_with_eight_pins() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = fixture_catalog(&sb);
        let ne555 = catalog.part_id("Timer", "NE555D").unwrap();

        let mut matcher = FootprintMatcher::new();
        let found = matcher.candidates(&catalog, ne555).to_vec();
        assert_eq!(candidate_names(&catalog, &found), ["SOIC-8_3.9x4.9mm_P1.27mm"]);
    }

    fn numbered_pads(count: usize) -> Vec<trace_eda::Pad> {
        (1..=count)
            .map(|n| trace_eda::Pad::through_hole(n.to_string(), (n as f64, 0.0), 1.5, 0.8))
            .collect()
    }

    #[test]
    fn auto_assign_picks_the_footprint_with_matching_pads() {
        use crate::{ComponentSpec, UserPart};
        use trace_eda::{ElectricalKind, Footprint, PinDescriptor, Symbol};

        let mut s = Session::new(Catalog::empty());
        let soic16 = s
            .catalog_mut()
            .add_footprint(Footprint::new("Package_SO", "SOIC-16_3.9x9.9mm", numbered_pads(16)));
        let soic8 = s
            .catalog_mut()
            .add_footprint(Footprint::new("Package_SO", "SOIC-8_3.9x4.9mm", numbered_pads(8)));

        let symbol = Symbol {
            name: "OPAMP_DUAL".into(),
            reference: "U".into(),
            footprint_filters: vec!["SOIC*".into(), "TSSOP*".into()],
            pins: (1..=8)
                .map(|n| PinDescriptor::new(n.to_string(), format!("P{n}"), ElectricalKind::Passive))
                .collect(),
            ..Symbol::default()
        };
        let part = s.catalog_mut().register_part(UserPart::new(symbol)).unwrap();
        let u1 = s.add_component(ComponentSpec::new(part)).unwrap();

        let misses = auto_assign(&mut s, &[u1]);
        assert!(misses.is_empty());
        assert_eq!(s.component(u1).footprint, Some(soic8));
        assert_eq!(s.candidates(part), [soic8]);
        assert!(!s.candidates(part).contains(&soic16));
    }

    #[test]
    fn pad_count_must_match() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = fixture_catalog(&sb);
        let q = catalog.part_id("Device", "Q_PNP_EBC").unwrap();
        let r = catalog.part_id("Device", "R_US").unwrap();

        let mut matcher = FootprintMatcher::new();
        let found = matcher.candidates(&catalog, q).to_vec();
        assert_eq!(candidate_names(&catalog, &found), ["TO-92_Inline"]);
        let found = matcher.candidates(&catalog, r).to_vec();
        assert_eq!(
            candidate_names(&catalog, &found),
            ["R_Axial_DIN0207_L6.3mm_D2.5mm_P10.16mm_Horizontal"]
        );
    }

    #[test]
    fn results_are_cached_per_part() {
        let sb = LibrarySandbox::with_kicad_fixtures();
        let mut catalog = fixture_catalog(&sb);
        let led = catalog.part_id("Device", "LED").unwrap();

        let mut matcher = FootprintMatcher::new();
        assert_eq!(matcher.candidates(&catalog, led).len(), 1);
        catalog.add_footprint(trace_eda::Footprint::new("LED_THT", "LED_D3.0mm", vec![
            trace_eda::Pad::through_hole("1", (0.0, 0.0), 1.8, 0.9),
            trace_eda::Pad::through_hole("2", (2.54, 0.0), 1.8, 0.9),
        ]));
        assert_eq!(matcher.candidates(&catalog, led).len(), 1);
        matcher.clear();
        assert_eq!(matcher.candidates(&catalog, led).len(), 2);
    }
}
