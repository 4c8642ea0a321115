//! Renders machine intents onto the node's console.
//!
//! Screens go to stdout as the unit's display; lamp and buzzer intents have
//! no hardware here, so they land in the log.

use ride_core::intent::Intent;
use tracing::info;

pub fn render(intent: &Intent) {
    match intent {
        Intent::Screen { title, lines } => {
            println!();
            println!("== {title} ==");
            for line in lines {
                println!("{line}");
            }
        }
        Intent::Beep { times, duration_ms } => {
            info!(times, duration_ms, "beep");
        }
        Intent::Lamps { yellow, red, green } => {
            info!(yellow, red, green, "lamps");
        }
    }
}
