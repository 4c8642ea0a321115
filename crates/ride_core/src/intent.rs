//! Display and annunciator intents emitted by the state machines.
//!
//! Machines queue intents as they transition; the node loop drains and
//! renders them. Emission never blocks a transition.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Text screen for the unit's display.
    Screen { title: String, lines: Vec<String> },
    /// Buzzer pattern.
    Beep { times: u8, duration_ms: u64 },
    /// Indicator lamp states on the kiosk.
    Lamps { yellow: bool, red: bool, green: bool },
}

impl Intent {
    pub fn screen<T, L>(title: T, lines: L) -> Self
    where
        T: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Intent::Screen {
            title: title.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn beep(times: u8, duration_ms: u64) -> Self {
        Intent::Beep { times, duration_ms }
    }

    pub fn lamps(yellow: bool, red: bool, green: bool) -> Self {
        Intent::Lamps { yellow, red, green }
    }
}
