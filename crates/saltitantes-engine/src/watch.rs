//! Tracks whether the end of a started run still has to be announced.
//!
//! A run can end on its own while a command is being handled, so the
//! command loop checks the watch after every iteration instead of relying
//! on the stop notification alone.

/// What a command did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    /// The run state is unchanged.
    Unchanged,
    /// A run was started.
    Started,
    /// The running simulation was stopped by command and already reported.
    Stopped,
}

/// Remembers a started run until its end has been announced.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndWatch {
    pending: bool,
}

impl EndWatch {
    /// Nothing pending.
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Whether a started run has not been announced as over yet.
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Fold in the effect of one command.
    pub const fn record(&mut self, event: RunEvent) {
        match event {
            RunEvent::Unchanged => {}
            RunEvent::Started => self.pending = true,
            RunEvent::Stopped => self.pending = false,
        }
    }

    /// Returns `true` exactly once after a pending run stops running.
    pub const fn take_finished(&mut self, running: bool) -> bool {
        if self.pending && !running {
            self.pending = false;
            true
        } else {
            false
        }
    }
}
