//! End-to-end tests covering the concrete scenarios and testable
//! properties the crate is specified against: engine invariants, expander
//! completeness, and crib-search results across all three execution
//! shapes.

use std::collections::HashSet;

use enigma::config::MachineConfiguration;
use enigma::engine::Engine;
use enigma::error::SearchError;
use enigma::plugboard::Plugboard;
use enigma::search;
use enigma::search::parallel::search_parallel;
use enigma::template::Template;

fn engine_from(s: &str) -> Engine {
    let config: MachineConfiguration = s.parse().unwrap();
    Engine::new(&config)
}

// --- Engine invariants (spec §8) -------------------------------------

#[test]
fn encode_then_reset_then_encode_is_involutive() {
    let config: MachineConfiguration = "B I-II-III 1-1-1 A-A-Z".parse().unwrap();
    let mut engine = Engine::new(&config);
    let cipher = engine.encode_string("ENIGMAWASHARDTOBREAK");

    let mut reset = Engine::new(&config);
    let plain = reset.encode_string(&cipher);
    assert_eq!(plain, "ENIGMAWASHARDTOBREAK");
}

#[test]
fn no_letter_ever_encodes_to_itself() {
    let mut engine = engine_from("B I-II-III 1-1-1 A-A-A");
    for c in 'A'..='Z' {
        assert_ne!(engine.encode_char(c), c);
    }
}

#[test]
fn double_step_advances_the_middle_rotor_on_consecutive_keystrokes() {
    // III-II-I, fastest (rightmost) is I, starting at A-D-O; notch letters
    // are V (III), E (II), Q (I). Four keystrokes should walk the rightmost
    // wheel O->P->Q->R->S, with the middle wheel sitting on its own notch E
    // after the second keystroke and therefore double-stepping on the third
    // (D->D->E->F), carrying the left wheel along on that same keystroke
    // (A->A->A->B).
    let mut engine = engine_from("B III-II-I 1-1-1 A-D-O");
    let expected = [['A', 'D', 'P'], ['A', 'D', 'Q'], ['A', 'E', 'R'], ['B', 'F', 'S']];

    for step_expectation in expected {
        engine.encode_char('A');
        let windows = engine.rotor_window_letters();
        // windows is rightmost-first; step_expectation is left-to-right.
        assert_eq!(
            [windows[2], windows[1], windows[0]],
            step_expectation,
            "unexpected rotor windows after a keystroke"
        );
    }
}

// --- Expander (spec §8) -----------------------------------------------

#[test]
fn expander_candidate_count_matches_per_field_product() {
    // 3 reflectors x (2 rotor slots wildcarded over disjoint small lists,
    // third fixed) x positions fixed x rings fixed.
    let template = Template::parse("? [I,II,III]-[I,II,III]-V 1-1-1 A-A-A").unwrap();
    let configs = template.expand();
    // 3 reflectors * (3*3 rotor combos - 3 duplicate-kind combos) = 3 * 6 = 18
    assert_eq!(configs.len(), 18);
}

#[test]
fn expander_output_round_trips_through_render_and_reparse() {
    let template = Template::parse("B I-II-III 1-1-1 A-A-Z HL MO").unwrap();
    for cfg in template.expand() {
        let rendered = cfg.to_string();
        let reparsed: MachineConfiguration = rendered.parse().unwrap();
        assert_eq!(cfg, reparsed);
    }
}

// --- Search driver (spec §8, concrete scenarios) ----------------------

#[test]
fn scenario_1_three_rotor_known_plaintext_with_plugboard() {
    let mut engine = engine_from("B I-II-III 1-1-1 A-A-Z HL MO AJ CX BZ SR NI YW DG PK");
    assert_eq!(engine.encode_string("HELLOWORLD"), "RFKTMBXVVW");
}

#[test]
fn scenario_2_four_rotor_with_beta_and_ten_plugs() {
    let mut engine = engine_from(
        "A IV-V-Beta-I 18-24-3-5 E-Z-G-P PC XZ FM QA ST NB HY OR EV IU",
    );
    let cipher = "BUPXWJCDPFASXBDHLBBIBSRNWCSZXQOLBNXYAXVHOGCUUIBCVMPUZYUUKHI";
    assert_eq!(
        engine.encode_string(cipher),
        "CONGRATULATIONSONPRODUCINGYOURWORKINGENIGMAMACHINESIMULATOR"
    );
}

#[test]
fn scenario_3_template_with_beta_gamma_and_wildcard_reflector() {
    let ciphertext = "DMEXBMKYCVPNQBEDHXVPZGKMTFFBJRPJTLHLCHOTKOYXGGHZ";
    let crib = "SECRETS";
    let template = Template::parse("? Beta-Gamma-V 4-2-14 M-J-M KI-XN-FL").unwrap();

    let matches = search::search_single_threaded(ciphertext, crib, template.expand()).unwrap();

    assert!(matches.iter().any(|m| {
        m.configuration.reflector() == enigma::rotor::ReflectorKind::C
            && m.decryption == "NICEWORKYOUVEMANAGEDTODECODETHEFIRSTSECRETSTRING"
    }));
}

#[test]
fn scenario_4_template_with_wildcard_positions() {
    let ciphertext = "CMFSUPKNCBMUYEQVVDYKLRQZTPUFHSWWAKTUGXMPAMYAFITXIJKMH";
    let crib = "UNIVERSITY";
    let template = Template::parse("B Beta-I-III 23-2-10 ?-?-? VH-PT-ZG-BJ-EY-FS").unwrap();

    let matches = search::search_single_threaded(ciphertext, crib, template.expand()).unwrap();

    assert!(matches.iter().any(|m| {
        // textual I-M-G, stored rightmost-first as G-M-I
        m.decryption == "IHOPEYOUAREENJOYINGTHEUNIVERSITYOFBATHEXPERIENCESOFAR"
            && m.configuration.positions().to_vec() == vec![6u8, 12, 8]
    }));
}

#[test]
fn scenario_5_tampered_reflector_search() {
    let ciphertext = "HWREISXLGTTBYVXRCWWJAKZDTVZWKBDJPVQYNEQIOTIFX";
    let crib = "INSTAGRAM";
    let template = Template::parse("? V-II-IV 6-18-7 A-J-L UG-IE-PO-NX-WT").unwrap();
    let configs: Vec<MachineConfiguration> = template
        .expand()
        .into_iter()
        .filter(|c| c.reflector() == enigma::rotor::ReflectorKind::B)
        .collect();

    let b_wiring: String = enigma::rotor::ReflectorKind::B
        .wiring()
        .iter()
        .map(|&i| enigma::alphabet::letter_of(i))
        .collect();
    let wirings = enigma::reflector_perm::permute_by_two_wire_swaps(&b_wiring);

    let offsets = search::possible_crib_positions(ciphertext, crib);
    let trials = search::build_trials_with_reflector_wirings(&configs, &offsets, &wirings);

    let crib_indices: Vec<u8> = crib.chars().map(|c| enigma::alphabet::index_of(c).unwrap()).collect();
    let cipher_indices: Vec<u8> = ciphertext.chars().map(|c| enigma::alphabet::index_of(c).unwrap()).collect();

    let matches: Vec<_> = trials
        .iter()
        .filter_map(|t| search::evaluate_trial(t, &crib_indices, &cipher_indices, ciphertext))
        .collect();

    assert!(matches.iter().any(|m| {
        m.decryption == "YOUCANFOLLOWMYDOGONINSTAGRAMATTALESOFHOFFMANN"
            && m.reflector_wiring.as_deref() == Some("PQUHRSLDYXNGOKMABEFZCWVJIT")
    }));
}

#[test]
fn scenario_6_invalid_inputs_are_rejected() {
    let result = search::search_single_threaded("AB", "ABCDE", std::iter::empty());
    assert!(matches!(result, Err(SearchError::CiphertextShorterThanCrib { .. })));

    let plugboard = Plugboard::new(&[('K', 'K')]);
    assert!(plugboard.is_err());
}

// --- Execution-shape agreement (spec §8) -------------------------------

#[test]
fn single_threaded_and_local_parallel_find_the_same_matches() {
    let cfg: MachineConfiguration = "B I-II-III 1-1-1 A-A-Z".parse().unwrap();
    let mut engine = Engine::new(&cfg);
    let plaintext = "THEQUICKBROWNFOXCRIBWINDOW";
    let ciphertext = engine.encode_string(plaintext);

    let template = Template::parse("B I-II-III 1-1-1 A-A-Z").unwrap();

    let single: HashSet<String> = search::search_single_threaded(&ciphertext, "THEQUICK", template.expand())
        .unwrap()
        .into_iter()
        .map(|m| m.decryption)
        .collect();
    let parallel: HashSet<String> = search_parallel(&ciphertext, "THEQUICK", template.expand())
        .unwrap()
        .into_iter()
        .map(|m| m.decryption)
        .collect();

    assert_eq!(single, parallel);
    assert!(single.contains(plaintext));
}

// --- Reflector permutation generator (spec §8) -------------------------

#[test]
fn reflector_generator_produces_4290_valid_involutions() {
    let b_wiring: String = enigma::rotor::ReflectorKind::B
        .wiring()
        .iter()
        .map(|&i| enigma::alphabet::letter_of(i))
        .collect();
    let wirings = enigma::reflector_perm::permute_by_two_wire_swaps(&b_wiring);
    assert_eq!(wirings.len(), 4290);

    for wiring in &wirings {
        let raw = enigma::rotor::parse_raw_wiring(wiring).unwrap();
        for i in 0u8..26 {
            assert_ne!(raw[i as usize], i);
            assert_eq!(raw[raw[i as usize] as usize], i);
        }
    }
}
