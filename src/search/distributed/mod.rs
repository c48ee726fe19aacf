//! The distributed execution shape: a TCP master hands out batches of
//! trials to any number of connecting clients, who evaluate them locally
//! and report matches, a one-off speed sample, and a final sentinel.
//!
//! Grounded in `code_breaking_distributed.py`'s job-queue/result-queue
//! server, reworked onto a length-framed [`wire`] protocol in place of
//! Python's `multiprocessing.managers` shared queues.

pub mod client;
pub mod master;
pub mod wire;

use crate::config::MachineConfiguration;
use crate::error::ConfigError;
use crate::rotor::parse_raw_wiring;

use super::Trial;
use wire::TrialSpec;

pub(crate) fn trial_to_spec(trial: &Trial) -> TrialSpec {
    TrialSpec {
        configuration: trial.configuration.to_string(),
        offset: trial.offset,
        reflector_wiring: trial
            .reflector_wiring
            .map(|w| w.iter().map(|&i| crate::alphabet::letter_of(i)).collect()),
    }
}

pub(crate) fn spec_to_trial(spec: &TrialSpec) -> Result<Trial, ConfigError> {
    // Not `spec.configuration.parse()`: the expander can hand the search
    // driver configurations `FromStr`/`try_new` would reject outright (e.g.
    // Beta/Gamma outside the fourth slot, spec §4.2's "`is_valid` checks
    // plug disjointness only"). The wire codec must accept exactly what
    // `expand()` emits, so it re-hydrates through the same lenient path.
    let configuration = MachineConfiguration::from_str_lenient(&spec.configuration)?;
    let reflector_wiring = spec
        .reflector_wiring
        .as_deref()
        .map(parse_raw_wiring)
        .transpose()?;
    Ok(Trial {
        configuration,
        offset: spec.offset,
        reflector_wiring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reproduces scenario 3's template (`? Beta-Gamma-V ...`): the expander
    /// emits 3-rotor configurations with a thin rotor outside the fourth
    /// slot, which `trial_to_spec`/`spec_to_trial` must round-trip even
    /// though `MachineConfiguration::from_str` rejects that string outright.
    #[test]
    fn round_trips_a_trial_with_a_thin_rotor_outside_the_fourth_slot() {
        let configuration = MachineConfiguration::from_str_lenient("C Beta-Gamma-V 4-2-14 M-J-M")
            .expect("expander-shaped configuration should parse leniently");
        let trial = Trial {
            configuration: configuration.clone(),
            offset: 3,
            reflector_wiring: None,
        };

        let spec = trial_to_spec(&trial);
        let round_tripped = spec_to_trial(&spec).expect("wire round trip should succeed");

        assert_eq!(round_tripped.configuration, configuration);
        assert_eq!(round_tripped.offset, 3);
    }
}
