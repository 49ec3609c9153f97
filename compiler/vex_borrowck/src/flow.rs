//! Loop exits for the flow-sensitive phases.
//!
//! `break` and `continue` end the current path early. The state at that
//! point still flows somewhere: a `continue` back to the loop head, a
//! `break` to the statement after the loop. Each phase keeps a
//! [`LoopStack`] of its own state type and records exits into the
//! innermost loop.

/// How a path leaves a loop body early.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Exit {
    Break,
    Continue,
}

/// States captured at the exits of one loop.
#[derive(Debug)]
pub(crate) struct LoopExits<S> {
    pub breaks: Vec<S>,
    pub continues: Vec<S>,
}

impl<S> Default for LoopExits<S> {
    fn default() -> Self {
        LoopExits {
            breaks: Vec::new(),
            continues: Vec::new(),
        }
    }
}

/// The loops enclosing the statement being walked, innermost last.
#[derive(Debug)]
pub(crate) struct LoopStack<S> {
    frames: Vec<LoopExits<S>>,
}

impl<S> Default for LoopStack<S> {
    fn default() -> Self {
        LoopStack { frames: Vec::new() }
    }
}

impl<S> LoopStack<S> {
    pub(crate) fn push(&mut self) {
        self.frames.push(LoopExits::default());
    }

    /// Close the innermost loop and hand back its exits.
    pub(crate) fn pop(&mut self) -> LoopExits<S> {
        self.frames.pop().unwrap_or_default()
    }

    /// Record `state` as leaving the innermost loop. Returns `false` when
    /// there is no enclosing loop; the state is then discarded.
    pub(crate) fn record(&mut self, exit: Exit, state: S) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        match exit {
            Exit::Break => frame.breaks.push(state),
            Exit::Continue => frame.continues.push(state),
        }
        true
    }
}
