//! Bypass and selection state machine, run at the top of every block.

use crate::control::ControlMailbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainState {
    /// Input copied unchanged to both outputs. Power-up state.
    #[default]
    Bypassed,
    Active,
}

/// What changed at this block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockTransition {
    /// Bypassed → Active: every stage must start from silence.
    pub reengaged: bool,
    /// Model to load before processing.
    pub model: Option<usize>,
    /// Impulse response to install before processing.
    pub impulse: Option<usize>,
}

/// Owned by the audio callback; the mailbox is its only input.
#[derive(Debug, Clone)]
pub struct ChainController {
    state: ChainState,
    model_index: usize,
    impulse_index: usize,
}

impl ChainController {
    pub fn new(model_index: usize, impulse_index: usize) -> Self {
        Self {
            state: ChainState::Bypassed,
            model_index,
            impulse_index,
        }
    }

    #[inline]
    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn model_index(&self) -> usize {
        self.model_index
    }

    pub fn impulse_index(&self) -> usize {
        self.impulse_index
    }

    /// Consume at most one toggle request and pick up selection changes.
    pub(crate) fn begin_block(&mut self, mailbox: &ControlMailbox) -> BlockTransition {
        let mut transition = BlockTransition::default();

        if mailbox.take_toggle_request() {
            self.state = match self.state {
                ChainState::Bypassed => {
                    transition.reengaged = true;
                    ChainState::Active
                }
                ChainState::Active => ChainState::Bypassed,
            };
            mailbox.publish_bypassed(self.state == ChainState::Bypassed);
        }

        let model = mailbox.model_index();
        if model != self.model_index {
            self.model_index = model;
            transition.model = Some(model);
        }

        let impulse = mailbox.impulse_index();
        if impulse != self.impulse_index {
            self.impulse_index = impulse;
            transition.impulse = Some(impulse);
        }

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlHandle;
    use crate::params::{ParameterRanges, ParameterSnapshot};
    use std::sync::Arc;

    fn setup() -> (ChainController, Arc<ControlMailbox>, ControlHandle) {
        let mailbox = Arc::new(ControlMailbox::new(ParameterSnapshot::default(), 0, 0));
        let handle = ControlHandle::new(mailbox.clone(), ParameterRanges::new(2.0), 5, 3);
        (ChainController::new(0, 0), mailbox, handle)
    }

    #[test]
    fn test_powers_up_bypassed() {
        let (mut controller, mailbox, handle) = setup();
        assert_eq!(controller.state(), ChainState::Bypassed);
        assert!(handle.is_bypassed());

        let t = controller.begin_block(&mailbox);
        assert_eq!(t, BlockTransition::default());
    }

    #[test]
    fn test_toggle_cycle() {
        let (mut controller, mailbox, handle) = setup();

        handle.request_bypass_toggle();
        let t = controller.begin_block(&mailbox);
        assert!(t.reengaged);
        assert_eq!(controller.state(), ChainState::Active);
        assert!(!handle.is_bypassed());

        // Consumed: the next block sees nothing
        assert!(!controller.begin_block(&mailbox).reengaged);

        handle.request_bypass_toggle();
        let t = controller.begin_block(&mailbox);
        assert!(!t.reengaged);
        assert_eq!(controller.state(), ChainState::Bypassed);
        assert!(handle.is_bypassed());
    }

    #[test]
    fn test_double_request_collapses() {
        let (mut controller, mailbox, handle) = setup();
        handle.request_bypass_toggle();
        handle.request_bypass_toggle();

        controller.begin_block(&mailbox);
        controller.begin_block(&mailbox);
        assert_eq!(controller.state(), ChainState::Active);
    }

    #[test]
    fn test_selection_reported_once() {
        let (mut controller, mailbox, handle) = setup();
        handle.select_model(3).unwrap();
        handle.select_impulse_response(2).unwrap();

        let t = controller.begin_block(&mailbox);
        assert_eq!(t.model, Some(3));
        assert_eq!(t.impulse, Some(2));

        let t = controller.begin_block(&mailbox);
        assert_eq!(t.model, None);
        assert_eq!(t.impulse, None);
        assert_eq!(controller.model_index(), 3);
    }
}
