//! Parses a partial-configuration template — `?` wildcards and `[X, Y]` list
//! alternatives in any scalar field — and expands it into the set of
//! concrete, valid configurations it describes.
//!
//! Grounded in `all_enigma_settings_candidates`/`all_possible_settings`: this
//! crate's deliberately strict bracket-list parser stands in for what the
//! original built with a bare `eval()` on the same list syntax (spec §9:
//! `eval` of template list literals is a security hazard and must not
//! survive translation).

use std::collections::HashSet;

use itertools::Itertools;

use crate::alphabet;
use crate::config::MachineConfiguration;
use crate::error::ConfigError;
use crate::rotor::{ALL_REFLECTOR_KINDS, ALL_ROTOR_KINDS, ReflectorKind, RotorKind};

/// One field's worth of candidates: either every value the field's domain
/// supports (`?`), or an explicit, caller-supplied list.
#[derive(Debug, Clone)]
enum Field<T> {
    Wildcard,
    List(Vec<T>),
}

impl<T: Clone> Field<T> {
    fn candidates(&self, all: &[T]) -> Vec<T> {
        match self {
            Field::Wildcard => all.to_vec(),
            Field::List(v) => v.clone(),
        }
    }
}

/// A plug template token: a fully known pair, a half-known pair (`?X`, one
/// lead ends at `X`), or an explicit list of candidate pairs.
#[derive(Debug, Clone)]
enum PlugField {
    Exact(char, char),
    HalfKnown(char),
    List(Vec<(char, char)>),
}

impl PlugField {
    /// All concrete pairs this token could resolve to.
    fn candidates(&self) -> Vec<(char, char)> {
        match self {
            PlugField::Exact(a, b) => vec![(*a, *b)],
            PlugField::HalfKnown(known) => ('A'..='Z')
                .filter(|c| c != known)
                .map(|c| (c, *known))
                .collect(),
            PlugField::List(v) => v.clone(),
        }
    }
}

/// A parsed template, still in textual (slot-N..slot-0) field order.
#[derive(Debug, Clone)]
pub struct Template {
    reflector: Field<ReflectorKind>,
    rotors: Vec<Field<RotorKind>>,
    ring_settings: Vec<Field<i32>>,
    positions: Vec<Field<char>>,
    plugs: Vec<PlugField>,
}

fn parse_bracket_list<T, F>(s: &str, parse_one: F) -> Result<Vec<T>, ConfigError>
where
    F: Fn(&str) -> Result<T, ConfigError>,
{
    let inner = s
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ConfigError::MalformedTemplate(s.to_string()))?;
    inner.split(',').map(|tok| parse_one(tok.trim())).collect()
}

fn parse_field<T, F>(token: &str, parse_one: F) -> Result<Field<T>, ConfigError>
where
    F: Fn(&str) -> Result<T, ConfigError>,
{
    if token == "?" {
        Ok(Field::Wildcard)
    } else if token.starts_with('[') {
        Ok(Field::List(parse_bracket_list(token, parse_one)?))
    } else {
        Ok(Field::List(vec![parse_one(token)?]))
    }
}

fn parse_ring_int(s: &str) -> Result<i32, ConfigError> {
    s.parse::<i32>()
        .map_err(|_| ConfigError::MalformedTemplate(s.to_string()))
}

fn parse_position_char(s: &str) -> Result<char, ConfigError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if alphabet::index_of(c).is_some() => Ok(c),
        _ => Err(ConfigError::MalformedTemplate(s.to_string())),
    }
}

fn parse_plug_token(tok: &str) -> Result<(char, char), ConfigError> {
    let mut chars = tok.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(ConfigError::MalformedTemplate(tok.to_string())),
    }
}

fn parse_plug_field(token: &str) -> Result<PlugField, ConfigError> {
    if token.starts_with('[') {
        Ok(PlugField::List(parse_bracket_list(token, parse_plug_token)?))
    } else if let Some(rest) = token.strip_prefix('?') {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(known), None) => Ok(PlugField::HalfKnown(known)),
            _ => Err(ConfigError::MalformedTemplate(token.to_string())),
        }
    } else {
        let (a, b) = parse_plug_token(token)?;
        Ok(PlugField::Exact(a, b))
    }
}

impl Template {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ConfigError::MalformedTemplate(s.to_string()));
        }

        let reflector = parse_field(parts[0], |t| ReflectorKind::parse(t))?;

        let rotors = parts[1]
            .split('-')
            .map(|t| parse_field(t, |t| RotorKind::parse(t)))
            .collect::<Result<Vec<_>, _>>()?;

        let ring_settings = parts[2]
            .split('-')
            .map(|t| parse_field(t, parse_ring_int))
            .collect::<Result<Vec<_>, _>>()?;

        let positions = parts[3]
            .split('-')
            .map(|t| parse_field(t, parse_position_char))
            .collect::<Result<Vec<_>, _>>()?;

        if rotors.len() != ring_settings.len() || rotors.len() != positions.len() {
            return Err(ConfigError::MalformedTemplate(s.to_string()));
        }

        let plugs = parts[4..]
            .iter()
            .map(|t| parse_plug_field(t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            reflector,
            rotors,
            ring_settings,
            positions,
            plugs,
        })
    }

    /// Expands the template into every concrete, valid configuration it
    /// describes, deduplicated via set semantics on the configuration value.
    ///
    /// Collects eagerly: realistic templates (the ones this crate's search
    /// driver is actually handed) prune heavily before reaching this point.
    /// A fully wildcarded template is astronomically large (spec §4.3) and
    /// is the caller's responsibility to avoid, not this method's to stream
    /// around.
    pub fn expand(&self) -> HashSet<MachineConfiguration> {
        let reflectors = self.reflector.candidates(&ALL_REFLECTOR_KINDS);

        let rotor_tuples = self.expand_rotor_tuples();
        let ring_tuples = self.expand_scalar_tuples(&self.ring_settings, &(1..=26).collect::<Vec<_>>());
        let position_tuples =
            self.expand_scalar_tuples(&self.positions, &('A'..='Z').collect::<Vec<_>>());
        let plug_combos = self.expand_plug_combos();

        let mut out = HashSet::new();
        for &reflector in &reflectors {
            for rotors in &rotor_tuples {
                for positions in &position_tuples {
                    for rings in &ring_tuples {
                        for plugs in &plug_combos {
                            let position_indices: Vec<u8> = positions
                                .iter()
                                .map(|&c| alphabet::index_of(c).expect("validated position char"))
                                .collect();
                            let ring_indices: Vec<u8> =
                                rings.iter().map(|&r| (r - 1) as u8).collect();

                            let cfg = MachineConfiguration::from_parts_unchecked(
                                reflector,
                                rotors.clone(),
                                position_indices,
                                ring_indices,
                                plugs.clone(),
                            );
                            if cfg.is_valid() {
                                out.insert(cfg);
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Per-slot rotor candidates, Cartesian-producted in textual (slot-N
    /// first) order, duplicate-kind tuples dropped, then reversed to the
    /// internal slot-0-first order the engine and configuration use.
    fn expand_rotor_tuples(&self) -> Vec<Vec<RotorKind>> {
        let per_slot: Vec<Vec<RotorKind>> = self
            .rotors
            .iter()
            .map(|f| f.candidates(&ALL_ROTOR_KINDS))
            .collect();

        per_slot
            .into_iter()
            .multi_cartesian_product()
            .filter(|combo| {
                let unique: HashSet<RotorKind> = combo.iter().copied().collect();
                unique.len() == combo.len()
            })
            .map(|mut combo| {
                combo.reverse();
                combo
            })
            .collect()
    }

    fn expand_scalar_tuples<T: Clone>(&self, fields: &[Field<T>], all: &[T]) -> Vec<Vec<T>> {
        let per_slot: Vec<Vec<T>> = fields.iter().map(|f| f.candidates(all)).collect();
        per_slot
            .into_iter()
            .multi_cartesian_product()
            .map(|mut combo| {
                combo.reverse();
                combo
            })
            .collect()
    }

    /// Plug-token candidates Cartesian-producted across all template plug
    /// slots, dropping any combination whose flattened letters repeat.
    fn expand_plug_combos(&self) -> Vec<Vec<(char, char)>> {
        if self.plugs.is_empty() {
            return vec![Vec::new()];
        }
        let per_token: Vec<Vec<(char, char)>> =
            self.plugs.iter().map(PlugField::candidates).collect();

        per_token
            .into_iter()
            .multi_cartesian_product()
            .filter(|combo| {
                let mut seen = HashSet::new();
                combo
                    .iter()
                    .all(|&(a, b)| seen.insert(a) && seen.insert(b))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_known_template_expands_to_exactly_one_configuration() {
        let t = Template::parse("B I-II-III 1-1-1 A-A-Z").unwrap();
        let set = t.expand();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn wildcard_reflector_expands_to_three() {
        let t = Template::parse("? I-II-III 1-1-1 A-A-Z").unwrap();
        assert_eq!(t.expand().len(), 3);
    }

    #[test]
    fn rotor_list_excludes_duplicate_tuples() {
        let t = Template::parse("B [I,II]-[I,II]-III 1-1-1 A-A-Z").unwrap();
        // Of the 2*2=4 raw combinations, the two with I==I or II==II are
        // dropped, leaving 2.
        assert_eq!(t.expand().len(), 2);
    }

    #[test]
    fn half_known_plug_enumerates_the_other_end() {
        let t = Template::parse("B I-II-III 1-1-1 A-A-Z ?S").unwrap();
        // 25 candidate letters to pair with S.
        assert_eq!(t.expand().len(), 25);
    }

    #[test]
    fn round_trip_through_render_and_reparse() {
        let t = Template::parse("B I-II-III 1-1-1 A-A-Z HL MO").unwrap();
        for cfg in t.expand() {
            let rendered = cfg.to_string();
            let reparsed: MachineConfiguration = rendered.parse().unwrap();
            assert_eq!(cfg, reparsed);
        }
    }

    #[test]
    fn rejects_malformed_template() {
        assert!(Template::parse("B I-II-III 1-1-1").is_err());
    }
}
