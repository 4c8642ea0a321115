//! Stdin feed for the control loops.
//!
//! Operator commands and simulated sensor lines arrive on stdin; a reader
//! thread forwards them over a channel so the control loop never blocks on
//! input.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{unbounded, Receiver};

/// Spawn a thread that forwards stdin lines to the returned receiver.
/// The thread exits when stdin closes or the receiver is dropped.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
