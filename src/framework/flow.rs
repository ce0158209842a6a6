//! # Step Flows
//!
//! A step flow shows one step of an ordered list at a time, collects each step's data and
//! calls a completion callback once the last step is done. It is built on selection-mode
//! injection: only the active step is rendered, and it receives an `on_next` [`Callback`].
//!
//! ## Ownership
//!
//! - **Uncontrolled** ([`UncontrolledFlow`]): the flow owns the index and the collected
//!   data. Completion is terminal; every later transition returns [`FlowError::Finished`].
//! - **Controlled** ([`ControlledFlow`]): the parent owns a [`FlowMachine`] (or any index of
//!   its own) and passes the index in on every render. The flow is then a pure function of
//!   `(steps, index, on_next)`. This is how a step that only exists for some data (for
//!   example an extra question when `age > 65`) is handled: the parent rebuilds the step
//!   list from the collected data and uses [`FlowMachine::advance_with`].
//!
//! ## States
//!
//! `Active(0) → Active(1) → … → Active(n - 1) → Finished`. Index `n` is never a step.
//! [`retreat`](FlowMachine::retreat) moves back one step without touching the data, for
//! Previous/Next steppers.

use super::descriptor::{params, Callback, Child, Prop};
use super::error::FlowError;
use super::inject::select;
use super::lock;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Data collected from the steps, keyed by field name.
pub type StepData = Map<String, Value>;

type OnFinish = Box<dyn FnOnce(StepData) + Send>;

/// Name of the callback parameter steps receive unless configured otherwise.
pub const DEFAULT_CALLBACK: &str = "on_next";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Active(usize),
    Finished,
}

/// Completion that still has to be delivered, outside of any lock.
struct Completion(OnFinish, StepData);

impl Completion {
    fn deliver(self) {
        (self.0)(self.1)
    }
}

/// Index plus collected data of a step flow.
pub struct FlowMachine {
    index: usize,
    data: StepData,
    on_finish: Option<OnFinish>,
    finished: bool,
}

impl Default for FlowMachine {
    fn default() -> Self {
        Self {
            index: 0,
            data: StepData::new(),
            on_finish: None,
            finished: false,
        }
    }
}

impl FlowMachine {
    /// Machine at step 0 that hands the collected data to `on_finish` on completion.
    pub fn new(on_finish: impl FnOnce(StepData) + Send + 'static) -> Self {
        Self {
            on_finish: Some(Box::new(on_finish)),
            ..Self::default()
        }
    }

    /// Merges `step_data` and moves to the next of `step_count` steps.
    pub fn advance(&mut self, step_data: StepData, step_count: usize) -> Result<FlowState, FlowError> {
        self.advance_with(step_data, |_| step_count)
    }

    /// Like [`advance`](Self::advance), with the step count derived from the merged data.
    pub fn advance_with(
        &mut self,
        step_data: StepData,
        step_count: impl FnOnce(&StepData) -> usize,
    ) -> Result<FlowState, FlowError> {
        let completion = self.step(step_data, step_count)?;
        if let Some(completion) = completion {
            completion.deliver();
        }
        Ok(self.state())
    }

    fn step(
        &mut self,
        step_data: StepData,
        step_count: impl FnOnce(&StepData) -> usize,
    ) -> Result<Option<Completion>, FlowError> {
        if self.finished {
            return Err(FlowError::Finished);
        }
        self.data.extend(step_data);
        let step_count = step_count(&self.data);
        self.index = (self.index + 1).min(step_count);
        if self.index < step_count {
            debug!(index = self.index, step_count, "Next step");
            return Ok(None);
        }
        Ok(self.complete())
    }

    /// Finishes the flow if the current index is no longer a step of `step_count`.
    ///
    /// A flow without steps is finished as soon as it is checked; the completion callback
    /// then receives empty data.
    pub fn sync_steps(&mut self, step_count: usize) -> FlowState {
        if !self.finished && self.index >= step_count {
            self.index = step_count;
            if let Some(completion) = self.complete() {
                completion.deliver();
            }
        }
        self.state()
    }

    /// Moves back one step. The data collected so far is kept.
    pub fn retreat(&mut self) -> Result<FlowState, FlowError> {
        if self.finished {
            return Err(FlowError::Finished);
        }
        if self.index == 0 {
            return Err(FlowError::AtFirstStep);
        }
        self.index -= 1;
        debug!(index = self.index, "Previous step");
        Ok(self.state())
    }

    /// Completes the flow at the current step with the data collected so far.
    pub fn finish(&mut self) -> Result<(), FlowError> {
        if self.finished {
            return Err(FlowError::Finished);
        }
        if let Some(completion) = self.complete() {
            completion.deliver();
        }
        Ok(())
    }

    fn complete(&mut self) -> Option<Completion> {
        self.finished = true;
        info!(steps = self.index, fields = self.data.len(), "Flow finished");
        self.on_finish
            .take()
            .map(|on_finish| Completion(on_finish, self.data.clone()))
    }

    pub fn state(&self) -> FlowState {
        if self.finished {
            FlowState::Finished
        } else {
            FlowState::Active(self.index)
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn data(&self) -> &StepData {
        &self.data
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl fmt::Debug for FlowMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowMachine")
            .field("index", &self.index)
            .field("data", &self.data)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// What a Previous/Next stepper can offer at the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub has_previous: bool,
    /// False on the last step, where the stepper offers "send" ([`UncontrolledFlow::finish`]).
    pub has_next: bool,
}

/// Turns the value a step passes to its callback into step data.
fn step_data_from(value: Value) -> StepData {
    match value {
        Value::Object(fields) => fields,
        Value::Null => StepData::new(),
        other => {
            warn!(value = %other, "Step data is not an object; ignored");
            StepData::new()
        }
    }
}

/// A flow that owns its index and collected data.
pub struct UncontrolledFlow {
    steps: Vec<Child>,
    machine: Arc<Mutex<FlowMachine>>,
    callback_name: String,
}

impl UncontrolledFlow {
    /// A flow over `steps`. With no steps it starts out finished and `on_finish` runs here.
    pub fn new(steps: Vec<Child>, on_finish: impl FnOnce(StepData) + Send + 'static) -> Self {
        let mut machine = FlowMachine::new(on_finish);
        machine.sync_steps(steps.len());
        Self {
            steps,
            machine: Arc::new(Mutex::new(machine)),
            callback_name: DEFAULT_CALLBACK.to_string(),
        }
    }

    /// Injects the advance callback under `name` instead of `on_next`.
    pub fn with_callback_name(mut self, name: impl Into<String>) -> Self {
        self.callback_name = name.into();
        self
    }

    /// The active step with its callback, or `None` once the flow is finished.
    ///
    /// The callback belongs to the step it was rendered with: once the flow has moved past
    /// that step, calling it again does nothing.
    pub fn render(&self) -> Option<Child> {
        let index = match self.state() {
            FlowState::Active(index) => index,
            FlowState::Finished => return None,
        };
        let machine = Arc::clone(&self.machine);
        let step_count = self.steps.len();
        let on_next = Callback::new(move |value| {
            let step_data = step_data_from(value);
            if let Err(e) = advance_shared(&machine, Some(index), step_data, step_count) {
                warn!(error = %e, "Step callback ignored");
            }
        });
        select(
            &self.steps,
            index,
            &params([(self.callback_name.clone(), Prop::Callback(on_next))]),
        )
    }

    pub fn navigation(&self) -> Navigation {
        let machine = lock(&self.machine);
        let active = !machine.is_finished();
        Navigation {
            has_previous: active && machine.current_index() > 0,
            has_next: active && machine.current_index() + 1 < self.steps.len(),
        }
    }

    pub fn advance(&self, step_data: StepData) -> Result<FlowState, FlowError> {
        advance_shared(&self.machine, None, step_data, self.steps.len())
    }

    pub fn retreat(&self) -> Result<FlowState, FlowError> {
        lock(&self.machine).retreat()
    }

    /// Completes the flow now, without new data.
    pub fn finish(&self) -> Result<(), FlowError> {
        let completion = {
            let mut machine = lock(&self.machine);
            if machine.is_finished() {
                return Err(FlowError::Finished);
            }
            machine.complete()
        };
        if let Some(completion) = completion {
            completion.deliver();
        }
        Ok(())
    }

    pub fn state(&self) -> FlowState {
        lock(&self.machine).state()
    }

    pub fn current_index(&self) -> usize {
        lock(&self.machine).current_index()
    }

    pub fn data(&self) -> StepData {
        lock(&self.machine).data().clone()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Advances `machine`. With `from` set, only if the machine is still at that step.
fn advance_shared(
    machine: &Mutex<FlowMachine>,
    from: Option<usize>,
    step_data: StepData,
    step_count: usize,
) -> Result<FlowState, FlowError> {
    let (completion, state) = {
        let mut machine = lock(machine);
        if let Some(from) = from {
            if !machine.is_finished() && machine.current_index() != from {
                debug!(from, index = machine.current_index(), "Stale step callback discarded");
                return Ok(machine.state());
            }
        }
        let completion = machine.step(step_data, |_| step_count)?;
        (completion, machine.state())
    };
    if let Some(completion) = completion {
        completion.deliver();
    }
    Ok(state)
}

/// A flow whose index lives in the parent.
#[derive(Debug, Clone)]
pub struct ControlledFlow {
    callback_name: String,
}

impl Default for ControlledFlow {
    fn default() -> Self {
        Self {
            callback_name: DEFAULT_CALLBACK.to_string(),
        }
    }
}

impl ControlledFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback_name(mut self, name: impl Into<String>) -> Self {
        self.callback_name = name.into();
        self
    }

    /// The step at `index` with `on_next` injected; `None` past the last step.
    pub fn render(&self, steps: &[Child], index: usize, on_next: &Callback) -> Option<Child> {
        select(
            steps,
            index,
            &params([(self.callback_name.clone(), Prop::Callback(on_next.clone()))]),
        )
    }
}
