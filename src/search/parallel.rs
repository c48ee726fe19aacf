//! The local-parallel execution shape: the same trial space as
//! [`super::search_single_threaded`], split into fixed-size batches and
//! handed to a [`rayon`] thread pool — "collecting ends up being faster as
//! the parallel iterator doesn't need to synchronise access" is the
//! Measter-enigma idiom this follows directly, just applied to crib
//! matching instead of fitness scoring.

use rayon::prelude::*;

use crate::config::MachineConfiguration;
use crate::error::SearchError;

use super::{
    build_trials, build_trials_with_reflector_wirings, evaluate_trial, possible_crib_positions,
    validate_inputs, Match, Trial,
};

/// Trials per batch. Small enough that one slow batch doesn't stall the
/// whole pool, large enough that per-batch overhead stays negligible.
const BATCH_SIZE: usize = 64;

fn to_indices(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| crate::alphabet::index_of(c).expect("input must be uppercase A-Z"))
        .collect()
}

fn run_batches(trials: Vec<Trial>, crib: &str, ciphertext: &str) -> Vec<Match> {
    let crib_indices = to_indices(crib);
    let cipher_indices = to_indices(ciphertext);

    trials
        .par_chunks(BATCH_SIZE)
        .flat_map_iter(|batch| {
            batch
                .iter()
                .filter_map(|trial| evaluate_trial(trial, &crib_indices, &cipher_indices, ciphertext))
        })
        .collect()
}

/// Runs the full (configuration × offset) product across a rayon thread
/// pool sized to the available cores, in fixed-size batches.
pub fn search_parallel(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
) -> Result<Vec<Match>, SearchError> {
    validate_inputs(ciphertext, crib)?;

    let offsets = possible_crib_positions(ciphertext, crib);
    let configs: Vec<MachineConfiguration> = configs.into_iter().collect();
    let trials = build_trials(&configs, &offsets);

    Ok(run_batches(trials, crib, ciphertext))
}

/// The tampered-reflector variant: the same batching, but over the larger
/// (configuration × offset × reflector wiring) product spec §4.5 produces.
pub fn search_parallel_with_reflector_wirings(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
    reflector_wirings: &[String],
) -> Result<Vec<Match>, SearchError> {
    validate_inputs(ciphertext, crib)?;

    let offsets = possible_crib_positions(ciphertext, crib);
    let configs: Vec<MachineConfiguration> = configs.into_iter().collect();
    let trials = build_trials_with_reflector_wirings(&configs, &offsets, reflector_wirings);

    Ok(run_batches(trials, crib, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::template::Template;

    #[test]
    fn finds_the_same_match_as_the_single_threaded_driver() {
        let cfg: MachineConfiguration = "B I-II-III 1-1-1 A-A-Z".parse().unwrap();
        let mut engine = Engine::new(&cfg);
        let plaintext = "THEQUICKBROWNFOXJUMPSCRIBTEXT";
        let ciphertext = engine.encode_string(plaintext);

        let template = Template::parse("B I-II-III 1-1-1 A-A-Z").unwrap();
        let matches = search_parallel(&ciphertext, "THEQUICK", template.expand()).unwrap();

        assert!(matches.iter().any(|m| m.decryption == plaintext));
    }
}
