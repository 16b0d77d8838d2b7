// Multi-step wizard state machine shared by the deploy and checkout flows
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Describes one concrete flow: its ordered steps, the draft it edits, and
/// which steps the draft currently satisfies.
pub trait WizardFlow: Send + Sync + 'static {
    type Draft: Default + Clone + Serialize + Send + Sync + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    const NAME: &'static str;
    const STEPS: &'static [&'static str];

    /// Whether `step` (1-based) is complete for `draft`
    fn step_valid(draft: &Self::Draft, step: usize) -> bool;

    fn apply(draft: &mut Self::Draft, patch: Self::Patch);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("step {step} ({name}) is incomplete")]
    StepInvalid { step: usize, name: &'static str },
    #[error("already at the last step")]
    AtLastStep,
    #[error("already at the first step")]
    AtFirstStep,
    #[error("submit is only available from the final step")]
    NotFinalStep,
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("wizard has already been completed")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editing,
    Submitting,
    Completed,
}

pub struct Wizard<F: WizardFlow> {
    step: usize,
    draft: F::Draft,
    phase: Phase,
}

impl<F: WizardFlow> Default for Wizard<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: WizardFlow> Wizard<F> {
    pub fn new() -> Self {
        Self {
            step: 1,
            draft: F::Draft::default(),
            phase: Phase::Editing,
        }
    }

    pub fn total_steps() -> usize {
        F::STEPS.len()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_name(&self) -> &'static str {
        F::STEPS[self.step - 1]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &F::Draft {
        &self.draft
    }

    pub fn current_step_valid(&self) -> bool {
        F::step_valid(&self.draft, self.step)
    }

    pub fn is_final_step(&self) -> bool {
        self.step == Self::total_steps()
    }

    pub fn draft_mut(&mut self) -> Result<&mut F::Draft, WizardError> {
        self.ensure_editing()?;
        Ok(&mut self.draft)
    }

    pub fn apply(&mut self, patch: F::Patch) -> Result<(), WizardError> {
        F::apply(self.draft_mut()?, patch);
        Ok(())
    }

    pub fn next(&mut self) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        if self.is_final_step() {
            return Err(WizardError::AtLastStep);
        }
        if !self.current_step_valid() {
            return Err(self.invalid());
        }
        self.step += 1;
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        if self.step == 1 {
            return Err(WizardError::AtFirstStep);
        }
        self.step -= 1;
        Ok(self.step)
    }

    /// Lock the wizard for its terminal action and hand out the draft to act on.
    pub fn begin_submit(&mut self) -> Result<F::Draft, WizardError> {
        self.ensure_editing()?;
        if !self.is_final_step() {
            return Err(WizardError::NotFinalStep);
        }
        if !self.current_step_valid() {
            return Err(self.invalid());
        }
        self.phase = Phase::Submitting;
        Ok(self.draft.clone())
    }

    pub fn finish_submit(&mut self) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Completed;
        }
    }

    pub fn abort_submit(&mut self) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Editing;
        }
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitting => Err(WizardError::AlreadySubmitting),
            Phase::Completed => Err(WizardError::Completed),
        }
    }

    fn invalid(&self) -> WizardError {
        WizardError::StepInvalid {
            step: self.step,
            name: self.step_name(),
        }
    }
}
