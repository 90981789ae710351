//! Session lifecycle: states, modes and the atomic state cell.
//!
//! ```text
//!  Uninitialized ──initialize──► Configured ──start──► Streaming
//!        ▲                           ▲                    │
//!        │                  register_buffer          stop / single block /
//!        │                           │               end of stream
//!        └──────uninitialize──── Stopped ◄────────────────┘
//! ```
//!
//! The state lives in an atomic so the producer can observe it from
//! interrupt context; only the application side writes it, except for the
//! producer's auto-stop (`Streaming → Stopped`), which is a compare-and-swap.

use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a stream session.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized = 0,
    Configured = 1,
    Streaming = 2,
    Stopped = 3,
}

impl SessionState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SessionState::Configured,
            2 => SessionState::Streaming,
            3 => SessionState::Stopped,
            _ => SessionState::Uninitialized,
        }
    }

    /// Buffers may be (re)registered only while no transfer can be running.
    pub const fn accepts_buffer(self) -> bool {
        matches!(self, SessionState::Configured | SessionState::Stopped)
    }

    /// `start` is defined from Configured and Stopped.
    pub const fn can_start(self) -> bool {
        matches!(self, SessionState::Configured | SessionState::Stopped)
    }
}

/// Streaming mode selected at `start`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Producer keeps cycling blocks until stopped.
    Continuous = 0,
    /// Producer transfers exactly one block, then the session stops and
    /// signals end-of-stream.
    Single = 1,
}

impl Mode {
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Mode::Single,
            _ => Mode::Continuous,
        }
    }
}

/// Which way data flows through the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The device is a source (sensor, microphone, camera): it fills blocks
    /// for the application to read.
    Input,
    /// The device is a sink (speaker, display): it drains blocks the
    /// application has filled.
    Output,
}

/// Session state shared between application and producer.
pub(crate) struct AtomicSession(AtomicU8);

impl AtomicSession {
    pub(crate) const fn new() -> Self {
        AtomicSession(AtomicU8::new(SessionState::Uninitialized as u8))
    }

    pub(crate) fn load(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, state: SessionState) {
        let prev = SessionState::from_u8(self.0.swap(state as u8, Ordering::SeqCst));
        if prev != state {
            log::debug!("session {:?} -> {:?}", prev, state);
        }
    }

    /// Atomically move `from → to`. Returns `false` if the state was not `from`.
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let ok = self
            .0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if ok {
            log::debug!("session {:?} -> {:?}", from, to);
        }
        ok
    }
}
