//! The machine itself: a stack of rotors and a reflector wired up from a
//! [`crate::config::MachineConfiguration`], stepped and encoded one letter
//! at a time.

use crate::config::MachineConfiguration;
use crate::plugboard::Plugboard;
use crate::rotor::Rotor;

/// A wired-up, steppable Enigma machine.
///
/// `rotors` is slot-0-first (rightmost/fastest first), matching
/// [`MachineConfiguration`]'s own indexing; `reflector` sits conceptually to
/// the left of every movable rotor and never steps.
#[derive(Debug, Clone)]
pub struct Engine {
    plugboard: Plugboard,
    rotors: Vec<Rotor>,
    reflector: Rotor,
}

impl Engine {
    /// Builds the machine described by `config`, with its historical
    /// reflector wiring.
    pub fn new(config: &MachineConfiguration) -> Self {
        Self::with_reflector_override(config, None)
    }

    /// Builds the machine described by `config`, substituting
    /// `reflector_wiring` for the reflector's historical table — the
    /// tampered-reflector search case.
    pub fn with_reflector_override(
        config: &MachineConfiguration,
        reflector_wiring: Option<[u8; 26]>,
    ) -> Self {
        let rotors = itertools::izip!(
            config.rotors(),
            config.positions(),
            config.ring_settings()
        )
        .map(|(&kind, &position, &ring)| Rotor::new(kind, position, ring))
        .collect();
        let reflector = Rotor::reflector(config.reflector(), reflector_wiring);
        // Already validated by the configuration's own constructor.
        let plugboard = Plugboard::new(config.plugs()).expect("configuration already validated");

        Self {
            plugboard,
            rotors,
            reflector,
        }
    }

    /// Steps the rotors the way a single keypress would, without encoding a
    /// character. The fastest rotor always steps; the second rotor follows
    /// if either the fastest just left its notch or the second rotor is
    /// itself sitting on its notch (the anomalous double-step); the third
    /// only follows the second's own notch-triggered step. A fourth, thin
    /// rotor (if present) never steps.
    fn step(&mut self) {
        let fastest_left_notch = self.rotors[0].is_at_notch();
        self.rotors[0].turnover();

        if self.rotors.len() > 1 && (fastest_left_notch || self.rotors[1].is_at_notch()) {
            let second_left_notch = self.rotors[1].is_at_notch();
            self.rotors[1].turnover();
            if second_left_notch && self.rotors.len() > 2 {
                self.rotors[2].turnover();
            }
        }
    }

    /// Steps the rotors `n` times without encoding anything, as a keyboard
    /// idling over `n` keypresses would. Used to fast-forward a freshly
    /// built machine to the rotor state it would have reached by the time a
    /// crib candidate's starting offset is reached in the ciphertext.
    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Encodes a single letter, given as a 0..26 index. Steps the rotors
    /// first, exactly as a real keypress does, then carries the signal
    /// through the plugboard, right to left across the rotor stack and the
    /// reflector, back left to right, and through the plugboard again.
    pub fn encode_index(&mut self, c: u8) -> u8 {
        let signal = self.plugboard.forward(c);
        self.step();

        let mut signal = signal;
        let mut right_position = 0u8;
        for rotor in &self.rotors {
            signal = rotor.forward(signal, right_position);
            right_position = rotor.position();
        }
        signal = self.reflector.forward(signal, right_position);

        let mut left_position = self.reflector.position();
        for rotor in self.rotors.iter().rev() {
            signal = rotor.backward(signal, left_position);
            left_position = rotor.position();
        }

        // The single stator offset (spec §4.1 step 6), applied once against
        // the rightmost rotor's position after the full backward pass.
        let rightmost_position = self.rotors[0].position();
        let signal = (signal + 26 - rightmost_position) % 26;

        self.plugboard.forward(signal)
    }

    /// Encodes a single uppercase letter.
    pub fn encode_char(&mut self, c: char) -> char {
        let idx = crate::alphabet::index_of(c).expect("non-letter passed to encode_char");
        crate::alphabet::letter_of(self.encode_index(idx))
    }

    /// Encodes (or, identically, decodes — Enigma is reciprocal) a whole
    /// string of uppercase letters.
    pub fn encode_string(&mut self, s: &str) -> String {
        s.chars().map(|c| self.encode_char(c)).collect()
    }

    /// The letters currently visible in each movable rotor's window,
    /// rightmost (fastest) first — the ring-setting-adjusted counterpart of
    /// the internally stored, ring-shifted `position` (spec §3: "position is
    /// stored after subtracting the ring offset"). Exposed for observing
    /// stepping behaviour (e.g. the double-step) from outside the engine.
    pub fn rotor_window_letters(&self) -> Vec<char> {
        self.rotors
            .iter()
            .map(|r| crate::alphabet::letter_of((r.position() + r.ring_setting()) % 26))
            .collect()
    }
}
