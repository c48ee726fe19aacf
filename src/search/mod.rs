//! The brute-force search driver: crib-offset pruning, per-trial evaluation,
//! and the single-threaded execution shape. [`parallel`] and [`distributed`]
//! build on the same [`Trial`]/[`evaluate_trial`] primitives for the other
//! two execution shapes spec §4.4 describes.

pub mod distributed;
pub mod parallel;

use std::time::Instant;

use log::info;
use rand::seq::SliceRandom;

use crate::alphabet;
use crate::config::MachineConfiguration;
use crate::engine::Engine;
use crate::error::SearchError;
use crate::rotor::parse_raw_wiring;

/// A configuration found to decrypt the crib window correctly, along with
/// the offset it matched at and the full ciphertext decrypted under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub configuration: MachineConfiguration,
    pub offset: usize,
    pub decryption: String,
    /// `Some(wiring)` only for the tampered-reflector search, where the
    /// configuration's own reflector kind is a stand-in and the wiring
    /// actually used was substituted in.
    pub reflector_wiring: Option<String>,
}

/// One (configuration, offset) unit of work, optionally with a substituted
/// reflector wiring for the tampered-reflector search.
#[derive(Debug, Clone)]
pub struct Trial {
    pub configuration: MachineConfiguration,
    pub offset: usize,
    pub reflector_wiring: Option<[u8; 26]>,
}

/// Every offset at which the crib could plausibly align with the
/// ciphertext: Enigma never encodes a letter to itself, so any offset with
/// an aligned equal pair is impossible and excluded.
pub fn possible_crib_positions(ciphertext: &str, crib: &str) -> Vec<usize> {
    let cipher_chars: Vec<char> = ciphertext.chars().collect();
    let crib_chars: Vec<char> = crib.chars().collect();
    if crib_chars.is_empty() || cipher_chars.len() < crib_chars.len() {
        return Vec::new();
    }
    (0..=cipher_chars.len() - crib_chars.len())
        .filter(|&pos| {
            crib_chars
                .iter()
                .zip(&cipher_chars[pos..pos + crib_chars.len()])
                .all(|(&p, &c)| p != c)
        })
        .collect()
}

/// The Cartesian product of a configuration set and an offset list, as
/// plain trials with no reflector override.
pub fn build_trials(configs: &[MachineConfiguration], offsets: &[usize]) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(configs.len() * offsets.len());
    for cfg in configs {
        for &offset in offsets {
            trials.push(Trial {
                configuration: cfg.clone(),
                offset,
                reflector_wiring: None,
            });
        }
    }
    trials
}

/// The Cartesian product of a configuration set, an offset list, and a set
/// of candidate reflector wirings — the tampered-reflector search's trial
/// space (spec §4.5's output feeding spec §4.4's per-trial evaluation).
pub fn build_trials_with_reflector_wirings(
    configs: &[MachineConfiguration],
    offsets: &[usize],
    reflector_wirings: &[String],
) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(configs.len() * offsets.len() * reflector_wirings.len());
    for cfg in configs {
        for &offset in offsets {
            for wiring in reflector_wirings {
                trials.push(Trial {
                    configuration: cfg.clone(),
                    offset,
                    reflector_wiring: Some(
                        parse_raw_wiring(wiring).expect("generator-produced wiring is valid"),
                    ),
                });
            }
        }
    }
    trials
}

fn to_indices(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| alphabet::index_of(c).expect("input must be uppercase A-Z"))
        .collect()
}

/// Builds an engine from the trial's configuration, advances it to the
/// trial's offset, and encodes the crib one character at a time, abandoning
/// on the first mismatch. On a full match, a *fresh* engine decodes the
/// whole ciphertext — the trial engine's positions have already been
/// advanced past the crib and must not be reused (spec §4.4).
pub fn evaluate_trial(
    trial: &Trial,
    crib_indices: &[u8],
    cipher_indices: &[u8],
    ciphertext: &str,
) -> Option<Match> {
    let mut engine = Engine::with_reflector_override(&trial.configuration, trial.reflector_wiring);
    engine.step_n(trial.offset);

    for (i, &crib_idx) in crib_indices.iter().enumerate() {
        if engine.encode_index(crib_idx) != cipher_indices[trial.offset + i] {
            return None;
        }
    }

    let mut fresh = Engine::with_reflector_override(&trial.configuration, trial.reflector_wiring);
    Some(Match {
        configuration: trial.configuration.clone(),
        offset: trial.offset,
        decryption: fresh.encode_string(ciphertext),
        reflector_wiring: trial
            .reflector_wiring
            .map(|w| w.iter().map(|&i| alphabet::letter_of(i)).collect()),
    })
}

fn validate_inputs(ciphertext: &str, crib: &str) -> Result<(), SearchError> {
    if crib.is_empty() {
        return Err(SearchError::EmptyCrib);
    }
    let (ciphertext_len, crib_len) = (ciphertext.chars().count(), crib.chars().count());
    if ciphertext_len < crib_len {
        return Err(SearchError::CiphertextShorterThanCrib {
            ciphertext_len,
            crib_len,
        });
    }
    Ok(())
}

/// Tunables for the single-threaded driver's progress reporting.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Number of trials to time before reporting an ETA.
    pub sample_size: usize,
    /// Search spaces below this many total trials get no ETA at all — the
    /// sample wouldn't be representative and the work finishes too fast to
    /// matter.
    pub eta_threshold: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            eta_threshold: 10_000,
        }
    }
}

/// Straight single-threaded iteration over the (configuration × offset)
/// product, with default progress-reporting tunables.
pub fn search_single_threaded(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
) -> Result<Vec<Match>, SearchError> {
    search_single_threaded_with_options(ciphertext, crib, configs, SearchOptions::default())
}

pub fn search_single_threaded_with_options(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
    options: SearchOptions,
) -> Result<Vec<Match>, SearchError> {
    validate_inputs(ciphertext, crib)?;

    let crib_indices = to_indices(crib);
    let cipher_indices = to_indices(ciphertext);
    let offsets = possible_crib_positions(ciphertext, crib);
    let configs: Vec<MachineConfiguration> = configs.into_iter().collect();

    // Shuffled once so the timing sample isn't biased toward low offsets,
    // which are cheaper to advance to than high ones.
    let mut trials = build_trials(&configs, &offsets);
    trials.shuffle(&mut rand::thread_rng());

    let total = trials.len();
    let report_at = options.sample_size.min(total);
    let mut matches = Vec::new();
    let start = Instant::now();

    for (i, trial) in trials.iter().enumerate() {
        if let Some(m) = evaluate_trial(trial, &crib_indices, &cipher_indices, ciphertext) {
            matches.push(m);
        }

        if total >= options.eta_threshold && i + 1 == report_at {
            let elapsed = start.elapsed();
            let per_trial = elapsed.as_secs_f64() / report_at as f64;
            let remaining = per_trial * (total - report_at) as f64;
            info!(
                "sampled {report_at} of {total} trials in {elapsed:?}; estimated {:.0}s-{:.0}s remaining",
                remaining * 0.95,
                remaining * 1.05,
            );
        }
    }

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Template;

    #[test]
    fn excludes_impossible_crib_offsets() {
        // SECRETS cannot start at offset 0 because the text's first letter
        // equals the crib's first letter there.
        let ciphertext = "DMEXBMKYCVPNQBEDHXVPZGKMTFFBJRPJTLHLCHOTKOYXGGHZ";
        let positions = possible_crib_positions(ciphertext, "SECRETS");
        assert!(!positions.contains(&0));
    }

    #[test]
    fn finds_known_configuration_for_a_known_plaintext() {
        let cfg: MachineConfiguration = "B I-II-III 1-1-1 A-A-Z".parse().unwrap();
        let mut engine = Engine::new(&cfg);
        let plaintext = "HELLOWORLDTHISISCRIBBABLE";
        let ciphertext = engine.encode_string(plaintext);

        let template = Template::parse("B I-II-III 1-1-1 A-A-Z").unwrap();
        let configs = template.expand();
        let matches = search_single_threaded(&ciphertext, "HELLO", configs).unwrap();

        assert!(matches.iter().any(|m| m.decryption == plaintext));
    }

    #[test]
    fn rejects_empty_crib() {
        let result = search_single_threaded("ABCDE", "", std::iter::empty());
        assert!(matches!(result, Err(SearchError::EmptyCrib)));
    }

    #[test]
    fn rejects_ciphertext_shorter_than_crib() {
        let result = search_single_threaded("AB", "ABCDE", std::iter::empty());
        assert!(matches!(
            result,
            Err(SearchError::CiphertextShorterThanCrib { .. })
        ));
    }
}
