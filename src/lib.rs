//! Known-plaintext (crib-based) brute-force cryptanalysis of the Enigma
//! cipher: an exact encoding engine (including the anomalous double-step),
//! a configuration model and template expander, a search driver offered in
//! single-threaded, local-parallel, and distributed execution shapes, and a
//! reflector permutation generator for the tampered-reflector case.
//!
//! This crate is deliberately a library, not a CLI: menus, argument
//! parsing, and human-facing result printing are left to callers.

pub mod alphabet;
pub mod config;
pub mod engine;
pub mod error;
pub mod plugboard;
pub mod reflector_perm;
pub mod rotor;
pub mod search;
pub mod template;
