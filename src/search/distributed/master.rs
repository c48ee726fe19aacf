//! The distributed master: binds a TCP port, hands batches of trials out to
//! any number of connecting clients, and aggregates matches, speed samples,
//! and termination signals.
//!
//! Grounded in `code_breaking_distributed.py::runserver`/`make_server_manager`,
//! reworked from a `multiprocessing.managers` shared-queue server onto a
//! plain TCP listener: one thread per connected client, a `Mutex`-guarded
//! job deque standing in for the Python `Queue`, and an `mpsc` channel
//! standing in for the shared result queue.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::MachineConfiguration;
use crate::error::DistributedError;
use crate::search::{
    build_trials, build_trials_with_reflector_wirings, possible_crib_positions, validate_inputs,
    Match,
};

use super::wire::{read_message, write_message, ClientMessage, ResultMessage, ServerMessage, TrialSpec};
use super::trial_to_spec;

/// Tunables for a master run. `port` and `token` have no mandated default
/// (spec §6: "defaults are suggested but not mandated"); the values here
/// mirror the original's `PORTNUM = 22222` / fixed `AUTHKEY`.
#[derive(Debug, Clone)]
pub struct MasterOptions {
    pub port: u16,
    pub token: String,
    /// Trials per batch handed to a client on each request.
    pub chunk_size: usize,
}

impl Default for MasterOptions {
    fn default() -> Self {
        Self {
            port: 22222,
            token: "authkey".to_string(),
            chunk_size: 50,
        }
    }
}

/// The aggregated outcome of a distributed run.
#[derive(Debug, Clone)]
pub struct DistributedOutcome {
    pub matches: Vec<Match>,
    pub elapsed: Duration,
}

enum AggregatorEvent {
    Joined(String),
    Result(String, ResultMessage),
}

/// Runs the master side of a distributed search to completion: binds
/// `options.port`, serves batches until the job queue is empty, and blocks
/// until every client that ever said hello has reported
/// [`ResultMessage::Final`] — spec §9's open question is resolved here in
/// favour of requiring *all* clients terminal, not "all but one", so a
/// client's late matches are never dropped.
pub fn run(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
    options: MasterOptions,
) -> Result<DistributedOutcome, DistributedError> {
    run_with_reflector_wirings(ciphertext, crib, configs, &[], options)
}

/// The tampered-reflector variant: batches carry the larger (configuration
/// × offset × reflector wiring) trial space spec §4.5 produces.
pub fn run_with_reflector_wirings(
    ciphertext: &str,
    crib: &str,
    configs: impl IntoIterator<Item = MachineConfiguration>,
    reflector_wirings: &[String],
    options: MasterOptions,
) -> Result<DistributedOutcome, DistributedError> {
    validate_inputs(ciphertext, crib)?;

    let offsets = possible_crib_positions(ciphertext, crib);
    let configs: Vec<MachineConfiguration> = configs.into_iter().collect();
    let trials = if reflector_wirings.is_empty() {
        build_trials(&configs, &offsets)
    } else {
        build_trials_with_reflector_wirings(&configs, &offsets, reflector_wirings)
    };

    let total = trials.len();
    let batches: VecDeque<Vec<TrialSpec>> = trials
        .chunks(options.chunk_size.max(1))
        .map(|chunk| chunk.iter().map(trial_to_spec).collect::<Vec<_>>())
        .collect();
    info!(
        "{total} trials in {} batches of up to {} to distribute amongst clients",
        batches.len(),
        options.chunk_size
    );

    let listener = TcpListener::bind(("0.0.0.0", options.port))?;
    info!("master listening on port {}", options.port);

    let jobs = Arc::new(Mutex::new(batches));
    let (tx, rx) = mpsc::channel::<AggregatorEvent>();
    let token = options.token.clone();
    let ciphertext_owned = ciphertext.to_string();
    let crib_owned = crib.to_string();

    let accept_jobs = Arc::clone(&jobs);
    let acceptor = thread::spawn(move || {
        for incoming in listener.incoming() {
            let Ok(stream) = incoming else { continue };
            let jobs = Arc::clone(&accept_jobs);
            let token = token.clone();
            let tx = tx.clone();
            let ciphertext = ciphertext_owned.clone();
            let crib = crib_owned.clone();
            thread::spawn(move || {
                if let Err(e) = handle_client(stream, &token, &jobs, &ciphertext, &crib, &tx) {
                    warn!("client connection ended: {e}");
                }
            });
        }
    });

    let start = Instant::now();
    let mut known_clients: HashSet<String> = HashSet::new();
    let mut terminal_clients: HashSet<String> = HashSet::new();
    let mut speeds: HashMap<String, f64> = HashMap::new();
    let mut matches = Vec::new();

    for event in rx {
        match event {
            AggregatorEvent::Joined(hostname) => {
                known_clients.insert(hostname);
            }
            AggregatorEvent::Result(
                _hostname,
                ResultMessage::Match {
                    configuration,
                    offset,
                    decryption,
                    reflector_wiring,
                },
            ) => {
                // Lenient, not `.parse()`: a client's reported configuration
                // may be one the expander emitted but `FromStr` would reject
                // (e.g. Beta/Gamma outside the fourth slot) — see
                // `spec_to_trial`'s doc comment.
                if let Ok(configuration) = MachineConfiguration::from_str_lenient(&configuration) {
                    matches.push(Match {
                        configuration,
                        offset,
                        decryption,
                        reflector_wiring,
                    });
                }
            }
            AggregatorEvent::Result(hostname, ResultMessage::Speed { trials_per_second }) => {
                speeds.insert(hostname.clone(), trials_per_second);
                let total_speed: f64 = speeds.values().sum();
                if total_speed > 0.0 {
                    let estimated = total as f64 / total_speed * 1.2;
                    let remaining = estimated - start.elapsed().as_secs_f64();
                    info!(
                        "{hostname} joined at {trials_per_second:.0} trials/s; estimated {remaining:.0}s remaining"
                    );
                }
            }
            AggregatorEvent::Result(hostname, ResultMessage::Final) => {
                debug!("{hostname} reported FINAL");
                terminal_clients.insert(hostname);
                if !known_clients.is_empty() && terminal_clients.is_superset(&known_clients) {
                    break;
                }
            }
        }
    }

    // Give workers time to observe the drained queue and exit cleanly
    // before the listener goes away (spec §4.4: "master sleeps briefly...").
    thread::sleep(Duration::from_millis(500));
    drop(acceptor);

    Ok(DistributedOutcome {
        matches,
        elapsed: start.elapsed(),
    })
}

fn handle_client(
    mut stream: TcpStream,
    token: &str,
    jobs: &Arc<Mutex<VecDeque<Vec<TrialSpec>>>>,
    ciphertext: &str,
    crib: &str,
    tx: &mpsc::Sender<AggregatorEvent>,
) -> std::io::Result<()> {
    let hello: ClientMessage = read_message(&mut stream)?;
    let hostname = match hello {
        ClientMessage::Hello { token: got, hostname } if got == token => {
            write_message(&mut stream, &ServerMessage::Welcome { accepted: true })?;
            hostname
        }
        ClientMessage::Hello { hostname, .. } => {
            write_message(&mut stream, &ServerMessage::Welcome { accepted: false })?;
            warn!("rejected client {hostname}: bad token");
            return Ok(());
        }
        _ => return Ok(()),
    };
    tx.send(AggregatorEvent::Joined(hostname.clone())).ok();

    loop {
        let msg: ClientMessage = read_message(&mut stream)?;
        match msg {
            ClientMessage::RequestBatch => {
                let batch = jobs.lock().unwrap().pop_front();
                match batch {
                    Some(trials) => write_message(
                        &mut stream,
                        &ServerMessage::Batch {
                            trials,
                            crib: crib.to_string(),
                            ciphertext: ciphertext.to_string(),
                        },
                    )?,
                    None => write_message(&mut stream, &ServerMessage::NoMoreWork)?,
                }
            }
            ClientMessage::Report(result) => {
                tx.send(AggregatorEvent::Result(hostname.clone(), result)).ok();
            }
            ClientMessage::Hello { .. } => {}
        }
    }
}
