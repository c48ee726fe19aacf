//! The machine configuration value type: an immutable description of a full
//! Enigma setup, its textual form, and validation.

use std::fmt;
use std::str::FromStr;

use crate::alphabet;
use crate::error::ConfigError;
use crate::plugboard::Plugboard;
use crate::rotor::{ReflectorKind, RotorKind};

/// An immutable, hashable description of a complete machine setup.
///
/// Rotor-related vectors are stored slot-0-first (rightmost, fastest wheel
/// first), matching the engine's own indexing; the textual form lists them
/// the other way around (leftmost first), so parsing and rendering both
/// reverse the three rotor-related lists (spec §4.2).
///
/// Plug pairs are stored canonicalized — each pair's letters sorted, then
/// the pair list itself sorted — so that `#[derive(PartialEq, Eq, Hash)]`
/// gives the value-identity semantics the template expander's deduplicating
/// set needs, rather than treating `"AB CD"` and `"CD AB"` as distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineConfiguration {
    reflector: ReflectorKind,
    rotors: Vec<RotorKind>,
    positions: Vec<u8>,
    ring_settings: Vec<u8>,
    plugs: Vec<(char, char)>,
}

impl MachineConfiguration {
    /// Fully validates and builds a configuration: rotor distinctness and
    /// slot rules, ring/position ranges, and plug disjointness.
    pub fn try_new(
        reflector: ReflectorKind,
        rotors: Vec<RotorKind>,
        positions: Vec<char>,
        ring_settings: Vec<i32>,
        plugs: &[(char, char)],
    ) -> Result<Self, ConfigError> {
        let n = rotors.len();
        if n != 3 && n != 4 {
            return Err(ConfigError::WrongRotorCount(n));
        }
        if positions.len() != n || ring_settings.len() != n {
            return Err(ConfigError::MalformedConfigString(
                "rotor/position/ring-setting counts must match".to_string(),
            ));
        }

        let mut seen_kinds = std::collections::HashSet::new();
        for &kind in &rotors {
            if !seen_kinds.insert(kind) {
                return Err(ConfigError::DuplicateRotorKind(kind.label().to_string()));
            }
        }
        if n == 4 {
            // slot 3 (last, leftmost) must be Beta or Gamma; slots 0..3 must
            // be distinct movable wheels.
            if !rotors[3].is_thin() {
                return Err(ConfigError::MissingThinRotorInFourthSlot);
            }
            if rotors[0..3].iter().any(|k| k.is_thin()) {
                return Err(ConfigError::ThinRotorOutsideFourthSlot);
            }
        } else if rotors.iter().any(|k| k.is_thin()) {
            return Err(ConfigError::ThinRotorOutsideFourthSlot);
        }

        let mut position_indices = Vec::with_capacity(n);
        for &c in &positions {
            position_indices.push(alphabet::index_of(c).ok_or(ConfigError::OutOfRangePosition(c))?);
        }

        let mut ring_indices = Vec::with_capacity(n);
        for &v in &ring_settings {
            if !(1..=26).contains(&v) {
                return Err(ConfigError::OutOfRangeRingSetting(v));
            }
            ring_indices.push((v - 1) as u8);
        }

        // Validates disjointness/self-pairs and gives us the canonical form.
        let plugboard = Plugboard::new(plugs)?;

        Ok(Self {
            reflector,
            rotors,
            positions: position_indices,
            ring_settings: ring_indices,
            plugs: plugboard.pairs(),
        })
    }

    /// Parses the same wire format [`FromStr`] does, but builds through
    /// [`Self::from_parts_unchecked`] and [`Self::is_valid`] rather than
    /// [`Self::try_new`]: it skips rotor-distinctness and thin-rotor-slot
    /// checks, accepting exactly the configurations the template expander's
    /// `expand()` can emit (e.g. Beta/Gamma outside the fourth slot, spec
    /// §4.2's "`is_valid` checks plug disjointness only") and nothing else
    /// round-trips through it.
    ///
    /// Used by the distributed execution shape to re-hydrate a
    /// [`Self::to_string`]-rendered configuration on the wire: that string
    /// may name a configuration `try_new`/[`FromStr`] would reject outright
    /// even though it was valid when the expander produced it, so the wire
    /// codec must mirror the expander's own construction path, not the
    /// caller-facing strict one.
    pub(crate) fn from_str_lenient(s: &str) -> Result<Self, ConfigError> {
        let (reflector, rotors, ring_settings, positions, plugs) = Self::parse_fields(s)?;
        let n = rotors.len();
        if n != 3 && n != 4 {
            return Err(ConfigError::WrongRotorCount(n));
        }
        if positions.len() != n || ring_settings.len() != n {
            return Err(ConfigError::MalformedConfigString(s.to_string()));
        }

        let mut position_indices = Vec::with_capacity(n);
        for c in positions {
            position_indices.push(alphabet::index_of(c).ok_or(ConfigError::OutOfRangePosition(c))?);
        }

        let mut ring_indices = Vec::with_capacity(n);
        for v in ring_settings {
            if !(1..=26).contains(&v) {
                return Err(ConfigError::OutOfRangeRingSetting(v));
            }
            ring_indices.push((v - 1) as u8);
        }

        let cfg = Self::from_parts_unchecked(reflector, rotors, position_indices, ring_indices, plugs);
        if !cfg.is_valid() {
            return Err(ConfigError::MalformedConfigString(s.to_string()));
        }
        Ok(cfg)
    }

    /// Assembles a configuration from already-validated, already-canonical
    /// parts without re-checking rotor distinctness, ranges, or plug
    /// disjointness. Used by the template expander, which has already
    /// filtered its per-category candidate lists for uniqueness; callers
    /// must still check [`Self::is_valid`] before accepting the result,
    /// matching spec §4.2's "`is_valid` checks plug disjointness only".
    pub(crate) fn from_parts_unchecked(
        reflector: ReflectorKind,
        rotors: Vec<RotorKind>,
        positions: Vec<u8>,
        ring_settings: Vec<u8>,
        plugs: Vec<(char, char)>,
    ) -> Self {
        let mut canonical_plugs: Vec<(char, char)> = plugs
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        canonical_plugs.sort_unstable();
        Self {
            reflector,
            rotors,
            positions,
            ring_settings,
            plugs: canonical_plugs,
        }
    }

    /// Spec §4.2's lightweight validity check: plug pairwise disjointness
    /// only. Rotor uniqueness is the expander's responsibility during its
    /// own Cartesian product, not re-checked here.
    pub fn is_valid(&self) -> bool {
        let mut seen = [false; 26];
        for &(a, b) in &self.plugs {
            let (Some(ia), Some(ib)) = (alphabet::index_of(a), alphabet::index_of(b)) else {
                return false;
            };
            if ia == ib || seen[ia as usize] || seen[ib as usize] {
                return false;
            }
            seen[ia as usize] = true;
            seen[ib as usize] = true;
        }
        true
    }

    pub fn reflector(&self) -> ReflectorKind {
        self.reflector
    }

    /// Slot-0-first (rightmost/fastest first), matching the engine.
    pub fn rotors(&self) -> &[RotorKind] {
        &self.rotors
    }

    /// Raw 0..26 indices, slot-0-first.
    pub fn positions(&self) -> &[u8] {
        &self.positions
    }

    /// Raw 0..26 indices (ring 1 == 0), slot-0-first.
    pub fn ring_settings(&self) -> &[u8] {
        &self.ring_settings
    }

    pub fn plugs(&self) -> &[(char, char)] {
        &self.plugs
    }

    /// Tokenizes the wire format (spec §4.2) into its raw fields, reversing
    /// the three rotor-related dash-lists from their textual (leftmost
    /// first) order to internal (slot-0/rightmost first) order. Shared by
    /// [`FromStr::from_str`] (strict, via [`Self::try_new`]) and
    /// [`Self::from_str_lenient`] (via [`Self::from_parts_unchecked`]) so
    /// both parse the exact same syntax and differ only in which
    /// constructor validates the result.
    fn parse_fields(
        s: &str,
    ) -> Result<(ReflectorKind, Vec<RotorKind>, Vec<i32>, Vec<char>, Vec<(char, char)>), ConfigError>
    {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ConfigError::MalformedConfigString(s.to_string()));
        }

        let reflector = ReflectorKind::parse(parts[0])?;

        let mut rotors = parts[1]
            .split('-')
            .map(RotorKind::parse)
            .collect::<Result<Vec<_>, _>>()?;
        rotors.reverse();

        let mut ring_settings = parts[2]
            .split('-')
            .map(|v| {
                v.parse::<i32>()
                    .map_err(|_| ConfigError::MalformedConfigString(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ring_settings.reverse();

        let mut positions = parts[3]
            .split('-')
            .map(|v| {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConfigError::MalformedConfigString(s.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        positions.reverse();

        let mut plugs = Vec::new();
        for tok in &parts[4..] {
            let mut chars = tok.chars();
            match (chars.next(), chars.next(), chars.next()) {
                (Some(a), Some(b), None) => plugs.push((a, b)),
                _ => return Err(ConfigError::MalformedConfigString(s.to_string())),
            }
        }

        Ok((reflector, rotors, ring_settings, positions, plugs))
    }
}

impl fmt::Display for MachineConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rotor_labels: Vec<&str> = self.rotors.iter().rev().map(|k| k.label()).collect();
        let ring_labels: Vec<String> = self
            .ring_settings
            .iter()
            .rev()
            .map(|&r| (r + 1).to_string())
            .collect();
        let pos_labels: Vec<char> = self
            .positions
            .iter()
            .rev()
            .map(|&p| alphabet::letter_of(p))
            .collect();
        let pos_str: String = pos_labels
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("-");

        write!(
            f,
            "{} {} {} {}",
            self.reflector.label(),
            rotor_labels.join("-"),
            ring_labels.join("-"),
            pos_str
        )?;

        for &(a, b) in &self.plugs {
            write!(f, " {a}{b}")?;
        }
        Ok(())
    }
}

impl FromStr for MachineConfiguration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (reflector, rotors, ring_settings, positions, plugs) = Self::parse_fields(s)?;
        Self::try_new(reflector, rotors, positions, ring_settings, &plugs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_round_trip() {
        let cfg: MachineConfiguration = "B I-II-III 1-1-1 A-A-Z HL MO AJ CX BZ SR NI YW DG PK"
            .parse()
            .unwrap();
        assert_eq!(cfg.rotors(), &[RotorKind::III, RotorKind::II, RotorKind::I]);
        let rendered = cfg.to_string();
        let reparsed: MachineConfiguration = rendered.parse().unwrap();
        assert_eq!(cfg, reparsed);
    }

    #[test]
    fn plug_order_does_not_affect_equality() {
        let a: MachineConfiguration = "B I-II-III 1-1-1 A-A-A HL MO".parse().unwrap();
        let b: MachineConfiguration = "B I-II-III 1-1-1 A-A-A MO-HL".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_duplicate_rotor_kind() {
        let result: Result<MachineConfiguration, _> = "B I-I-III 1-1-1 A-A-A".parse();
        assert!(result.is_err());
    }

    #[test]
    fn four_rotor_requires_thin_in_fourth_slot() {
        let ok: Result<MachineConfiguration, _> = "B I-II-III-IV 1-1-1-1 A-A-A-A".parse();
        assert!(ok.is_err());
        let ok: Result<MachineConfiguration, _> = "B Beta-V-IV-I 18-24-3-5 E-Z-G-P".parse();
        assert!(ok.is_ok());
    }

    #[test]
    fn strict_parse_rejects_thin_rotor_outside_fourth_slot() {
        let result: Result<MachineConfiguration, _> = "C Beta-Gamma-V 4-2-14 M-J-M".parse();
        assert!(matches!(result, Err(ConfigError::ThinRotorOutsideFourthSlot)));
    }

    /// The expander emits exactly this kind of value (scenario 3's template
    /// wildcards a reflector over `Beta-Gamma-V`); the wire codec must be
    /// able to round-trip it even though [`FromStr`] rejects the string.
    #[test]
    fn lenient_parse_accepts_what_the_expander_emits_and_round_trips() {
        let cfg = MachineConfiguration::from_str_lenient("C Beta-Gamma-V 4-2-14 M-J-M").unwrap();
        let rendered = cfg.to_string();
        let reparsed = MachineConfiguration::from_str_lenient(&rendered).unwrap();
        assert_eq!(cfg, reparsed);
    }

    #[test]
    fn lenient_parse_still_rejects_bad_plugboard() {
        let result = MachineConfiguration::from_str_lenient("B I-II-III 1-1-1 A-A-A KK");
        assert!(result.is_err());
    }
}
