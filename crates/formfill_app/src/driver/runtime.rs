use std::time::Duration;

use formfill_core::{update, AppState, Msg};
use formfill_logging::formfill_warn;

use super::effects::EffectRunner;
use super::render::render;

/// Feeds messages through `update` and executes the resulting effects
/// until the page has nothing left in flight.
pub struct Driver {
    state: AppState,
    runner: EffectRunner,
    idle_timeout: Duration,
}

impl Driver {
    /// `idle_timeout` bounds how long to wait for any single engine event.
    pub fn new(state: AppState, runner: EffectRunner, idle_timeout: Duration) -> Self {
        Self {
            state,
            runner,
            idle_timeout,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Pumps engine events until nothing is outstanding. Returns `false`
    /// if the engine went quiet first.
    pub fn settle(&mut self) -> bool {
        while !self.runner.is_idle() {
            match self.runner.next_msg(self.idle_timeout) {
                Some(msg) => self.dispatch(msg),
                None => {
                    formfill_warn!("No engine event within {:?}; giving up", self.idle_timeout);
                    return false;
                }
            }
        }
        true
    }

    /// Renders the page if anything changed since the last render.
    pub fn render_if_dirty(&mut self) -> Option<String> {
        if self.state.consume_dirty() {
            Some(render(&self.state.view()))
        } else {
            None
        }
    }
}
