//! The plugboard (Steckerbrett): a partial involution over the alphabet,
//! applied once before and once after the rotor stack.

use crate::error::ConfigError;

/// A partial involution over the alphabet: each letter is paired with at
/// most one other letter. Lookup maps a letter to its partner, or to itself
/// if unpaired. Cheap to copy, like the teacher's `[u8; 26]`-backed design.
#[derive(Debug, Clone, Copy)]
pub struct Plugboard {
    wiring: [u8; 26],
}

impl Plugboard {
    /// Builds a plugboard from unordered letter pairs. Rejects self-pairs
    /// and letters appearing in more than one pair.
    pub fn new(pairs: &[(char, char)]) -> Result<Self, ConfigError> {
        let mut wiring: [u8; 26] = std::array::from_fn(|i| i as u8);
        let mut seen = [false; 26];

        for &(a, b) in pairs {
            let ia = crate::alphabet::index_of(a)
                .ok_or_else(|| ConfigError::NonLetterInput(a))?;
            let ib = crate::alphabet::index_of(b)
                .ok_or_else(|| ConfigError::NonLetterInput(b))?;

            if ia == ib {
                return Err(ConfigError::SelfPairedPlug(a));
            }
            if seen[ia as usize] || seen[ib as usize] {
                return Err(ConfigError::DuplicatePlugLetter(
                    if seen[ia as usize] { a } else { b },
                ));
            }

            seen[ia as usize] = true;
            seen[ib as usize] = true;
            wiring[ia as usize] = ib;
            wiring[ib as usize] = ia;
        }

        Ok(Self { wiring })
    }

    pub fn empty() -> Self {
        Self {
            wiring: std::array::from_fn(|i| i as u8),
        }
    }

    pub fn forward(&self, c: u8) -> u8 {
        self.wiring[c as usize]
    }

    /// Pairs currently wired, one letter pair per connection, in ascending
    /// order of the lower letter — used both for re-rendering a
    /// configuration's plug list and by the tampered-reflector search's
    /// plug enumeration.
    pub fn pairs(&self) -> Vec<(char, char)> {
        let mut seen = [false; 26];
        let mut pairs = Vec::new();
        for (idx, &other) in self.wiring.iter().enumerate() {
            if idx as u8 == other || seen[idx] {
                continue;
            }
            seen[idx] = true;
            seen[other as usize] = true;
            pairs.push((
                crate::alphabet::letter_of(idx as u8),
                crate::alphabet::letter_of(other),
            ));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unplugged_letter_maps_to_itself() {
        let pb = Plugboard::new(&[('A', 'Z')]).unwrap();
        assert_eq!(pb.forward(crate::alphabet::index_of('B').unwrap()), 1);
    }

    #[test]
    fn plug_works_both_directions() {
        let pb = Plugboard::new(&[('K', 'U')]).unwrap();
        assert_eq!(
            pb.forward(crate::alphabet::index_of('K').unwrap()),
            crate::alphabet::index_of('U').unwrap()
        );
        assert_eq!(
            pb.forward(crate::alphabet::index_of('U').unwrap()),
            crate::alphabet::index_of('K').unwrap()
        );
    }

    #[test]
    fn rejects_self_pair() {
        assert!(matches!(
            Plugboard::new(&[('K', 'K')]),
            Err(ConfigError::SelfPairedPlug('K'))
        ));
    }

    #[test]
    fn rejects_duplicate_letter() {
        assert!(matches!(
            Plugboard::new(&[('S', 'Z'), ('K', 'S')]),
            Err(ConfigError::DuplicatePlugLetter(_))
        ));
    }
}
