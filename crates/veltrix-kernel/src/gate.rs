//! Authentication gate.
//!
//! The playground is invisible until an external signal says the user is
//! signed in. No slot access, no timers and no events happen while the gate
//! is closed; the session is built on sign-in and torn down on sign-out.

use std::sync::Arc;

use crate::config::PlaygroundConfig;
use crate::error::{Result, VfsError};
use crate::session::Session;
use crate::store::Slot;

pub struct Playground {
    config: PlaygroundConfig,
    slot: Arc<dyn Slot>,
    session: Option<Session>,
}

impl Playground {
    /// A closed gate. Does not touch `slot`.
    pub fn new(config: PlaygroundConfig, slot: Arc<dyn Slot>) -> Self {
        Self {
            config,
            slot,
            session: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Feed the authentication signal.
    ///
    /// Opening loads (or seeds) the tree; closing flushes pending edits and
    /// drops the session. The session is gone after a sign-out even when the
    /// final flush fails; the error is still returned.
    pub fn set_authenticated(&mut self, authenticated: bool) -> Result<()> {
        match (authenticated, self.session.is_some()) {
            (true, false) => {
                let session = Session::open(self.config.clone(), Arc::clone(&self.slot))?;
                self.session = Some(session);
                tracing::info!("signed in, playground visible");
                Ok(())
            }
            (false, true) => {
                let closed = match self.session.take() {
                    Some(session) => session.close(),
                    None => Ok(()),
                };
                tracing::info!("signed out, playground hidden");
                closed
            }
            _ => Ok(()),
        }
    }

    pub fn session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(VfsError::Unauthenticated)
    }

    pub fn session_mut(&mut self) -> Result<&mut Session> {
        self.session.as_mut().ok_or(VfsError::Unauthenticated)
    }
}
