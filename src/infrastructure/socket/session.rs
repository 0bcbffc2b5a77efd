//! Connection Session Bookkeeping
//!
//! Tracks the single live session of the gateway. Every `connect()` opens a
//! new epoch; a session task may only mutate state while its epoch is still
//! current, so a torn-down session can never clobber its successor.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::codec::SocketPacket;
use crate::domain::ConnectionState;
use crate::infrastructure::metrics;

/// Instruction from the gateway to its session task
#[derive(Debug)]
pub enum SessionCommand {
    Emit(SocketPacket),
    Close,
}

/// Handle to a running session task
pub struct SessionHandle {
    pub epoch: u64,
    pub commands: mpsc::UnboundedSender<SessionCommand>,
    pub task: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
    state: ConnectionState,
    epoch: u64,
    session: Option<SessionHandle>,
}

/// Mutex-guarded connection state shared by the gateway and its session task
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Whether `epoch` still identifies the live session.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.inner.lock().epoch == epoch
    }

    /// Move to `Connecting` under a fresh epoch and install the session that
    /// `spawn` builds for it.
    ///
    /// Fails with the current state when a session is already active.
    pub fn begin<F>(&self, spawn: F) -> Result<u64, ConnectionState>
    where
        F: FnOnce(u64) -> SessionHandle,
    {
        let mut inner = self.inner.lock();
        if inner.state.is_active() {
            return Err(inner.state);
        }
        inner.epoch += 1;
        inner.state = ConnectionState::Connecting;
        let handle = spawn(inner.epoch);
        inner.session = Some(handle);
        metrics::set_connection_state(ConnectionState::Connecting);
        Ok(inner.epoch)
    }

    /// Transition the session identified by `epoch`. Returns `false` when the
    /// session is stale and nothing changed.
    pub fn transition(&self, epoch: u64, to: ConnectionState) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            return false;
        }
        inner.state = to;
        if to == ConnectionState::Disconnected {
            inner.session = None;
        }
        metrics::set_connection_state(to);
        true
    }

    /// Tear down whatever session exists, invalidating its epoch.
    ///
    /// Returns the state before the reset and the detached session handle.
    pub fn reset(&self) -> (ConnectionState, Option<SessionHandle>) {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        let session = inner.session.take();
        if session.is_some() || previous.is_active() {
            inner.epoch += 1;
        }
        inner.state = ConnectionState::Disconnected;
        metrics::set_connection_state(ConnectionState::Disconnected);
        (previous, session)
    }

    /// Queue a command on the live session, if it is connected.
    pub fn emit(&self, command: SessionCommand) -> Result<(), EmitRejected> {
        let inner = self.inner.lock();
        if inner.state != ConnectionState::Connected {
            return Err(EmitRejected::NotConnected);
        }
        let session = inner.session.as_ref().ok_or(EmitRejected::NotConnected)?;
        session
            .commands
            .send(command)
            .map_err(|_| EmitRejected::SessionClosed)
    }
}

/// Why a command could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitRejected {
    NotConnected,
    SessionClosed,
}
