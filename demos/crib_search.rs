//! Demonstrates the crib-search API end to end: expand a wildcarded
//! template, run the single-threaded and local-parallel drivers over it,
//! and print whatever candidates surface.
//!
//! Mirrors the teacher's own `examples/video.rs` usage demo, just calling
//! the crib-cracking API instead of the hill-climbing one.

use std::time::Instant;

use enigma::search::parallel::search_parallel;
use enigma::search::search_single_threaded;
use enigma::template::Template;

const CIPHERTEXT: &str =
    "DMEXBMKYCVPNQBEDHXVPZGKMTFFBJRPJTLHLCHOTKOYXGGHZ";
const CRIB: &str = "SECRETS";
const TEMPLATE: &str = "? Beta-Gamma-V 4-2-14 M-J-M KI-XN-FL";

fn main() {
    env_logger::init();

    let template = Template::parse(TEMPLATE).expect("valid template");
    let configs = template.expand();
    println!("expanded template to {} candidate configurations", configs.len());

    let start = Instant::now();
    let matches = search_single_threaded(CIPHERTEXT, CRIB, configs.iter().cloned())
        .expect("ciphertext/crib inputs are valid");
    println!("single-threaded search took {:?}", start.elapsed());

    for m in &matches {
        println!("{} (offset {}) -> {}", m.configuration, m.offset, m.decryption);
    }

    let start = Instant::now();
    let parallel_matches =
        search_parallel(CIPHERTEXT, CRIB, configs).expect("ciphertext/crib inputs are valid");
    println!("local-parallel search took {:?}, {} matches", start.elapsed(), parallel_matches.len());
}
