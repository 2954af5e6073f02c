//! Caller-side bounds on a run.
//!
//! The engine itself runs unbounded. These helpers drive it one step at a
//! time and stop it on a step budget or a cancel flag flipped from another
//! thread (wall-clock timeout, ctrl+c).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::{Interpreter, StepEvent};
use crate::error::{Aborted, RuntimeError};
use crate::input::ByteSource;
use crate::tape::Tape;

/// Controls for cooperative cancellation and step limiting.
#[derive(Debug, Clone, Default)]
pub struct Limits {
    pub max_steps: Option<u64>,
    pub cancel: Arc<AtomicBool>,
}

impl Limits {
    pub fn new(max_steps: Option<u64>, cancel: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel }
    }

    /// No budget and a cancel flag nobody else holds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/// Called after every executed step with the resulting tape.
pub type Observer<'a> = &'a mut dyn FnMut(&StepEvent, &Tape);

/// Run `interp` to completion unless `limits` stop it first.
///
/// Limits are checked before each instruction, so a run with
/// `max_steps = Some(n)` executes at most `n` instructions.
pub fn run_limited<I>(
    interp: &mut Interpreter,
    input: &mut I,
    limits: &Limits,
    mut observer: Option<Observer<'_>>,
) -> Result<Vec<u8>, Aborted>
where
    I: ByteSource + ?Sized,
{
    loop {
        if interp.is_finished() {
            break;
        }
        if limits.is_canceled() {
            return Err(interp.abort(RuntimeError::Canceled));
        }
        if let Some(limit) = limits.max_steps {
            if interp.steps() >= limit {
                return Err(interp.abort(RuntimeError::StepLimitExceeded { limit }));
            }
        }

        match interp.step(input) {
            Ok(Some(event)) => {
                if let Some(observe) = observer.as_mut() {
                    observe(&event, interp.tape());
                }
            }
            Ok(None) => break,
            Err(error) => return Err(interp.abort(error)),
        }
    }

    tracing::debug!(
        steps = interp.steps(),
        output = interp.output().len(),
        "limited run finished"
    );
    Ok(interp.output().to_vec())
}
