//! Asynchronous event flags and callback delivery.
//!
//! Events originate in the producer's execution context (DMA completion ISR,
//! timer, polling loop) and are delivered synchronously to the registered
//! callback. Nothing is queued: conditions arising in the same producer step
//! are combined into a single notification.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Bitmask of stream events.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Event(u8);

impl Event {
    /// No event.
    pub const NONE: Event = Event(0);
    /// A block was transferred: data ready (input) or space available (output).
    pub const DATA: Event = Event(1 << 0);
    /// Input producer found no free block.
    pub const OVERFLOW: Event = Event(1 << 1);
    /// Output producer found no ready block.
    pub const UNDERFLOW: Event = Event(1 << 2);
    /// The stream ended; the session has stopped.
    pub const END_OF_STREAM: Event = Event(1 << 3);

    /// Raw bit representation.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, discarding unknown flags.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Event(bits & 0x0F)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` if every flag in `other` is set in `self`.
    pub const fn contains(self, other: Event) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Event {
    type Output = Event;

    fn bitor(self, rhs: Event) -> Event {
        Event(self.0 | rhs.0)
    }
}

impl BitOrAssign for Event {
    fn bitor_assign(&mut self, rhs: Event) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Event, &str); 4] = [
            (Event::DATA, "DATA"),
            (Event::OVERFLOW, "OVERFLOW"),
            (Event::UNDERFLOW, "UNDERFLOW"),
            (Event::END_OF_STREAM, "END_OF_STREAM"),
        ];
        if self.is_empty() {
            return f.write_str("Event(NONE)");
        }
        f.write_str("Event(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

/// Application callback invoked from the producer's context.
///
/// Must be `Sync` because it runs on the producer side while the
/// application continues on its own.
pub type EventCallback<'a> = &'a (dyn Fn(Event) + Sync);

/// Delivers a producer step's events to the registered callback, if any.
pub(crate) fn raise(callback: Option<EventCallback<'_>>, event: Event) {
    if event.is_empty() {
        return;
    }
    match callback {
        Some(cb) => cb(event),
        None => log::trace!("dropping {:?}: no callback registered", event),
    }
}
