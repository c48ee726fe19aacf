//! Rotor and reflector wiring tables, and the mutable rotor instance that
//! sits inside an [`crate::engine::Engine`].
//!
//! Wiring is hard-coded and generated at compile time, the same trick the
//! teacher crate uses ("the wiring is a fixed value ... generate these at
//! compile time"): a `const fn` turns the historical letter table into a
//! 0..26 permutation once, so building a [`Rotor`] per trial is just a
//! couple of array reads, not a re-parse.

use crate::error::ConfigError;

/// The five movable wheels, plus the two thin-position wheels that may only
/// occupy the leftmost (fourth) slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RotorKind {
    I = 0,
    II = 1,
    III = 2,
    IV = 3,
    V = 4,
    Beta = 5,
    Gamma = 6,
}

pub const ALL_ROTOR_KINDS: [RotorKind; 7] = [
    RotorKind::I,
    RotorKind::II,
    RotorKind::III,
    RotorKind::IV,
    RotorKind::V,
    RotorKind::Beta,
    RotorKind::Gamma,
];

/// Movable wheels that advance; Beta/Gamma never do (they're static fourth
/// wheels), so they're excluded here rather than threaded through a runtime
/// check on every step.
pub const MOVABLE_ROTOR_KINDS: [RotorKind; 5] = [
    RotorKind::I,
    RotorKind::II,
    RotorKind::III,
    RotorKind::IV,
    RotorKind::V,
];

const fn rotor_chars(kind: RotorKind) -> &'static [u8; 26] {
    match kind {
        RotorKind::I => b"EKMFLGDQVZNTOWYHXUSPAIBRCJ",
        RotorKind::II => b"AJDKSIRUXBLHWTMCQGZNPYFVOE",
        RotorKind::III => b"BDFHJLCPRTXVZNYEIWGAKMUSQO",
        RotorKind::IV => b"ESOVPZJAYQUIRHXLNFTGKDCMWB",
        RotorKind::V => b"VZBRGITYUPSDNHLXAWMJQOFECK",
        RotorKind::Beta => b"LEYJVCNIXWPBQMDRTAKZGFUHOS",
        RotorKind::Gamma => b"FSOKANUERHMBTIYCWLQPZXVGJD",
    }
}

const fn rotor_notch(kind: RotorKind) -> Option<u8> {
    match kind {
        RotorKind::I => Some(b'Q' - b'A'),
        RotorKind::II => Some(b'E' - b'A'),
        RotorKind::III => Some(b'V' - b'A'),
        RotorKind::IV => Some(b'J' - b'A'),
        RotorKind::V => Some(b'Z' - b'A'),
        RotorKind::Beta | RotorKind::Gamma => None,
    }
}

const fn gen_forward(kind: RotorKind) -> [u8; 26] {
    let chars = rotor_chars(kind);
    let mut wiring = [0u8; 26];
    let mut i = 0;
    while i < 26 {
        wiring[i] = chars[i] - b'A';
        i += 1;
    }
    wiring
}

const fn gen_backward(kind: RotorKind) -> [u8; 26] {
    let forward = gen_forward(kind);
    let mut backward = [0u8; 26];
    let mut i = 0;
    while i < 26 {
        backward[forward[i] as usize] = i as u8;
        i += 1;
    }
    backward
}

const ROTOR_FORWARD: [[u8; 26]; 7] = [
    gen_forward(RotorKind::I),
    gen_forward(RotorKind::II),
    gen_forward(RotorKind::III),
    gen_forward(RotorKind::IV),
    gen_forward(RotorKind::V),
    gen_forward(RotorKind::Beta),
    gen_forward(RotorKind::Gamma),
];

const ROTOR_BACKWARD: [[u8; 26]; 7] = [
    gen_backward(RotorKind::I),
    gen_backward(RotorKind::II),
    gen_backward(RotorKind::III),
    gen_backward(RotorKind::IV),
    gen_backward(RotorKind::V),
    gen_backward(RotorKind::Beta),
    gen_backward(RotorKind::Gamma),
];

impl RotorKind {
    pub fn forward_wiring(self) -> &'static [u8; 26] {
        &ROTOR_FORWARD[self as usize]
    }

    pub fn backward_wiring(self) -> &'static [u8; 26] {
        &ROTOR_BACKWARD[self as usize]
    }

    /// Notch letter as a 0..26 index, unshifted by any ring setting.
    pub fn raw_notch(self) -> Option<u8> {
        rotor_notch(self)
    }

    /// `true` for Beta/Gamma, which may only occupy the leftmost (fourth)
    /// slot and never advance.
    pub fn is_thin(self) -> bool {
        matches!(self, RotorKind::Beta | RotorKind::Gamma)
    }

    pub fn label(self) -> &'static str {
        match self {
            RotorKind::I => "I",
            RotorKind::II => "II",
            RotorKind::III => "III",
            RotorKind::IV => "IV",
            RotorKind::V => "V",
            RotorKind::Beta => "Beta",
            RotorKind::Gamma => "Gamma",
        }
    }

    pub fn parse(label: &str) -> Result<Self, ConfigError> {
        ALL_ROTOR_KINDS
            .iter()
            .copied()
            .find(|k| k.label() == label)
            .ok_or_else(|| ConfigError::UnknownRotorKind(label.to_string()))
    }
}

/// The three historical reflectors. Thin reflectors (B_thin/C_thin) are
/// intentionally not modelled: the expander never offers them as wildcard
/// candidates and nothing else in this crate needs them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReflectorKind {
    A = 0,
    B = 1,
    C = 2,
}

pub const ALL_REFLECTOR_KINDS: [ReflectorKind; 3] =
    [ReflectorKind::A, ReflectorKind::B, ReflectorKind::C];

const fn reflector_chars(kind: ReflectorKind) -> &'static [u8; 26] {
    match kind {
        ReflectorKind::A => b"EJMZALYXVBWFCRQUONTSPIKHGD",
        ReflectorKind::B => b"YRUHQSLDPXNGOKMIEBFZCWVJAT",
        ReflectorKind::C => b"FVPJIAOYEDRZXWGCTKUQSBNMHL",
    }
}

const fn gen_reflector_wiring(kind: ReflectorKind) -> [u8; 26] {
    let chars = reflector_chars(kind);
    let mut wiring = [0u8; 26];
    let mut i = 0;
    while i < 26 {
        wiring[i] = chars[i] - b'A';
        i += 1;
    }
    wiring
}

const REFLECTOR_WIRING: [[u8; 26]; 3] = [
    gen_reflector_wiring(ReflectorKind::A),
    gen_reflector_wiring(ReflectorKind::B),
    gen_reflector_wiring(ReflectorKind::C),
];

impl ReflectorKind {
    pub fn wiring(self) -> &'static [u8; 26] {
        &REFLECTOR_WIRING[self as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            ReflectorKind::A => "A",
            ReflectorKind::B => "B",
            ReflectorKind::C => "C",
        }
    }

    pub fn parse(label: &str) -> Result<Self, ConfigError> {
        ALL_REFLECTOR_KINDS
            .iter()
            .copied()
            .find(|k| k.label() == label)
            .ok_or_else(|| ConfigError::UnknownReflectorKind(label.to_string()))
    }
}

/// Parses a raw 26-letter wiring string (as produced by the reflector
/// permutation generator, or supplied directly for the tampered-reflector
/// case) into a 0..26 permutation array.
pub fn parse_raw_wiring(s: &str) -> Result<[u8; 26], ConfigError> {
    let bytes = s.as_bytes();
    if bytes.len() != 26 || !s.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::InvalidReflectorWiring(s.to_string()));
    }
    let mut wiring = [0u8; 26];
    for (i, &b) in bytes.iter().enumerate() {
        wiring[i] = b - b'A';
    }
    Ok(wiring)
}

/// A wheel placed in a slot, carrying the mutable position state an
/// [`crate::engine::Engine`] advances as it encodes characters.
///
/// `position` is stored *after* subtracting the ring offset (see spec §3):
/// encoding only ever needs to read `position`, never `ring_setting`
/// directly, and `notch` is pre-shifted by the same amount at construction
/// so it still compares correctly against `position`.
#[derive(Debug, Clone)]
pub struct Rotor {
    forward_wiring: [u8; 26],
    backward_wiring: [u8; 26],
    /// Ring setting, stored 0-based (ring 1 == 0). Kept only so the engine
    /// can report it back for diagnostics; encoding never reads it.
    ring_setting: u8,
    position: u8,
    notch: Option<u8>,
}

impl Rotor {
    /// `position` and `ring_setting` are both raw 0..26 indices (position:
    /// 'A' == 0; ring_setting: ring 1 == 0).
    pub fn new(kind: RotorKind, position: u8, ring_setting: u8) -> Self {
        Self::with_wiring(
            *kind.forward_wiring(),
            *kind.backward_wiring(),
            kind.raw_notch(),
            position,
            ring_setting,
        )
    }

    /// Builds the reflector as a non-advancing, notch-less rotor, optionally
    /// substituting `override_wiring` for its historical table (the
    /// tampered-reflector search case).
    pub fn reflector(kind: ReflectorKind, override_wiring: Option<[u8; 26]>) -> Self {
        let wiring = override_wiring.unwrap_or_else(|| *kind.wiring());
        // A reflector is its own inverse, so forward and backward tables
        // coincide; the engine still only ever calls `forward` on it.
        Self::with_wiring(wiring, wiring, None, 0, 0)
    }

    fn with_wiring(
        forward_wiring: [u8; 26],
        backward_wiring: [u8; 26],
        raw_notch: Option<u8>,
        position: u8,
        ring_setting: u8,
    ) -> Self {
        let shift = |v: u8| -> u8 {
            let shifted = v as i16 - ring_setting as i16;
            shifted.rem_euclid(26) as u8
        };
        Self {
            forward_wiring,
            backward_wiring,
            ring_setting,
            position: shift(position),
            notch: raw_notch.map(shift),
        }
    }

    pub fn is_at_notch(&self) -> bool {
        self.notch == Some(self.position)
    }

    pub fn turnover(&mut self) {
        self.position = (self.position + 1) % 26;
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn ring_setting(&self) -> u8 {
        self.ring_setting
    }

    /// Right-to-left signal path: `input_pin = (c + self.position -
    /// right_position) mod 26`, output is `forward_wiring[input_pin]`.
    pub fn forward(&self, c: u8, right_position: u8) -> u8 {
        let offset = (self.position as i16 - right_position as i16).rem_euclid(26) as u8;
        let input_pin = (c + offset) % 26;
        self.forward_wiring[input_pin as usize]
    }

    /// Left-to-right signal path: `input_pin = (c + self.position -
    /// left_position) mod 26`, output is `backward_wiring[input_pin]` — the
    /// inverse permutation of `forward_wiring`. No offset is re-applied to
    /// the output; the single stator offset is applied once, by the engine,
    /// after the rightmost rotor's backward step (spec step 6).
    pub fn backward(&self, c: u8, left_position: u8) -> u8 {
        let offset = (self.position as i16 - left_position as i16).rem_euclid(26) as u8;
        let input_pin = (c + offset) % 26;
        self.backward_wiring[input_pin as usize]
    }
}
