//! The distributed client: connects to a master, spawns a per-core worker
//! set, and pulls batches until the job queue is empty.
//!
//! Grounded in `code_breaking_distributed.py::runclient`/`make_client_manager`:
//! the connect-retry-until-online loop, the `cpus == 0` meaning "all
//! available cores," the per-worker speed sample after roughly `sample`
//! trials, and the single `FINAL` sent once every worker has exhausted the
//! queue.

use std::io;
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};

use super::spec_to_trial;
use super::wire::{read_message, write_message, ClientMessage, ResultMessage, ServerMessage};
use crate::search::evaluate_trial;

/// Tunables for a client run.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub server_addr: String,
    pub port: u16,
    pub token: String,
    /// Number of worker threads; `0` means "use all available cores", as
    /// the original's `cpus == 0` does.
    pub cores: usize,
    /// Trials a worker samples before reporting its speed once.
    pub sample_size: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1".to_string(),
            port: 22222,
            token: "authkey".to_string(),
            cores: 0,
            sample_size: 1000,
        }
    }
}

fn local_hostname() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string())
}

fn available_cores() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Connects to `options.server_addr:options.port`, retrying with backoff
/// until the master comes online, then runs `options.cores` worker threads
/// (or all available cores if `0`) pulling and evaluating batches until the
/// job queue is empty. Reports matches back as it finds them, one speed
/// sample per worker, and one `FINAL` sentinel once every worker has
/// exhausted the queue.
pub fn run(options: ClientOptions) -> io::Result<()> {
    let hostname = local_hostname();
    info!("waiting for {}:{} to give me a job...", options.server_addr, options.port);

    let mut stream = connect_with_retry(&options)?;
    write_message(
        &mut stream,
        &ClientMessage::Hello {
            token: options.token.clone(),
            hostname: hostname.clone(),
        },
    )?;
    let welcome: ServerMessage = read_message(&mut stream)?;
    match welcome {
        ServerMessage::Welcome { accepted: true } => {}
        ServerMessage::Welcome { accepted: false } => {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "authentication rejected"));
        }
        _ => return Err(io::Error::new(io::ErrorKind::InvalidData, "unexpected reply to hello")),
    }

    let cores = if options.cores > 0 { options.cores } else { available_cores() };
    info!("connected. using {cores} cpu cores");

    let shared_stream = Arc::new(Mutex::new(stream));
    let mut workers = Vec::with_capacity(cores);
    for _ in 0..cores {
        let shared_stream = Arc::clone(&shared_stream);
        let sample_size = options.sample_size;
        workers.push(thread::spawn(move || worker_loop(shared_stream, sample_size)));
    }
    for worker in workers {
        if let Err(e) = worker.join() {
            warn!("worker thread panicked: {e:?}");
        }
    }

    let mut stream = shared_stream.lock().unwrap();
    write_message(&mut stream, &ClientMessage::Report(ResultMessage::Final))?;
    Ok(())
}

fn connect_with_retry(options: &ClientOptions) -> io::Result<TcpStream> {
    loop {
        match TcpStream::connect((options.server_addr.as_str(), options.port)) {
            Ok(stream) => return Ok(stream),
            Err(_) => thread::sleep(Duration::from_millis(300)),
        }
    }
}

fn worker_loop(stream: Arc<Mutex<TcpStream>>, sample_size: usize) {
    let mut total_searched = 0usize;
    let mut speed_sent = false;
    let start = Instant::now();

    loop {
        let batch = {
            let mut stream = stream.lock().unwrap();
            if write_message(&mut *stream, &ClientMessage::RequestBatch).is_err() {
                return;
            }
            match read_message::<_, ServerMessage>(&mut *stream) {
                Ok(ServerMessage::Batch { trials, crib, ciphertext }) => Some((trials, crib, ciphertext)),
                Ok(ServerMessage::NoMoreWork) | Err(_) => None,
                Ok(ServerMessage::Welcome { .. }) => None,
            }
        };

        let Some((trials, crib, ciphertext)) = batch else {
            return;
        };

        let crib_indices: Vec<u8> = crib
            .chars()
            .map(|c| crate::alphabet::index_of(c).expect("crib must be uppercase A-Z"))
            .collect();
        let cipher_indices: Vec<u8> = ciphertext
            .chars()
            .map(|c| crate::alphabet::index_of(c).expect("ciphertext must be uppercase A-Z"))
            .collect();

        for spec in &trials {
            let Ok(trial) = spec_to_trial(spec) else { continue };
            if let Some(m) = evaluate_trial(&trial, &crib_indices, &cipher_indices, &ciphertext) {
                let mut stream = stream.lock().unwrap();
                write_message(
                    &mut *stream,
                    &ClientMessage::Report(ResultMessage::Match {
                        configuration: m.configuration.to_string(),
                        offset: m.offset,
                        decryption: m.decryption,
                        reflector_wiring: m.reflector_wiring,
                    }),
                )
                .ok();
            }
        }
        total_searched += trials.len();

        if sample_size > 0 && total_searched >= sample_size && !speed_sent {
            let trials_per_second = total_searched as f64 / start.elapsed().as_secs_f64();
            let mut stream = stream.lock().unwrap();
            write_message(
                &mut *stream,
                &ClientMessage::Report(ResultMessage::Speed { trials_per_second }),
            )
            .ok();
            speed_sent = true;
        }
    }
}
