// ABOUTME: Selection wizard — walks the user through one option pick per feature key.
// ABOUTME: Activated by a feature-selection reply; completes by handing back every pick at once.

use crate::chat::types::{FeatureMenu, FeatureOptions, FeatureSelections};

/// Coarse wizard state, for callers that only need to know where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Inactive,
    Presenting { index: usize },
}

/// Outcome of a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    /// The pick was recorded and the wizard moved to the step at `index`.
    Next { index: usize },
    /// The last key was answered; the wizard is inactive again.
    Complete(FeatureSelections),
    /// No wizard is running or the option index is out of range.
    Invalid,
}

/// Read-only view of the step being presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepView<'a> {
    pub prompt: &'a str,
    pub key: &'a str,
    pub options: &'a [String],
    pub highlighted: usize,
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Internal state of a running wizard; inspect it through [`SelectionWizard::current`].
pub struct Presentation {
    prompt: String,
    steps: Vec<FeatureOptions>,
    index: usize,
    selections: FeatureSelections,
    highlighted: usize,
}

/// The wizard itself. `Inactive` carries no state, so nothing from one run
/// can leak into the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionWizard {
    #[default]
    Inactive,
    Presenting(Box<Presentation>),
}

impl SelectionWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WizardState {
        match self {
            SelectionWizard::Inactive => WizardState::Inactive,
            SelectionWizard::Presenting(p) => WizardState::Presenting { index: p.index },
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SelectionWizard::Presenting(_))
    }

    /// Start presenting `menu`, one step per key in menu order.
    ///
    /// Keys without options are skipped. Returns `false`, leaving the wizard
    /// untouched, when no key is left to present.
    pub fn activate(&mut self, prompt: impl Into<String>, menu: FeatureMenu) -> bool {
        let steps = menu.presentable().into_steps();
        if steps.is_empty() {
            return false;
        }
        if self.is_active() {
            tracing::warn!("replacing an unfinished feature selection");
        }
        *self = SelectionWizard::Presenting(Box::new(Presentation {
            prompt: prompt.into(),
            steps,
            index: 0,
            selections: FeatureSelections::new(),
            highlighted: 0,
        }));
        true
    }

    /// The step currently on screen, if any.
    pub fn current(&self) -> Option<StepView<'_>> {
        let SelectionWizard::Presenting(p) = self else {
            return None;
        };
        let step = &p.steps[p.index];
        Some(StepView {
            prompt: &p.prompt,
            key: &step.key,
            options: &step.options,
            highlighted: p.highlighted,
            index: p.index,
            total: p.steps.len(),
        })
    }

    /// Picks recorded so far in this run.
    pub fn selections(&self) -> Option<&FeatureSelections> {
        match self {
            SelectionWizard::Inactive => None,
            SelectionWizard::Presenting(p) => Some(&p.selections),
        }
    }

    /// Move the highlight left (negative) or right (positive), clamped.
    pub fn move_highlight(&mut self, delta: isize) {
        if let SelectionWizard::Presenting(p) = self {
            let max = p.steps[p.index].options.len().saturating_sub(1);
            p.highlighted = p.highlighted.saturating_add_signed(delta).min(max);
        }
    }

    /// Pick the highlighted option.
    pub fn choose_highlighted(&mut self) -> WizardStep {
        let highlighted = match self {
            SelectionWizard::Inactive => return WizardStep::Invalid,
            SelectionWizard::Presenting(p) => p.highlighted,
        };
        self.choose(highlighted)
    }

    /// Pick option `option` for the current key.
    pub fn choose(&mut self, option: usize) -> WizardStep {
        let SelectionWizard::Presenting(p) = self else {
            return WizardStep::Invalid;
        };
        let step = &p.steps[p.index];
        let Some(choice) = step.options.get(option).cloned() else {
            return WizardStep::Invalid;
        };
        let key = step.key.clone();
        p.selections.insert(key, choice);

        if p.index + 1 < p.steps.len() {
            p.index += 1;
            p.highlighted = 0;
            return WizardStep::Next { index: p.index };
        }

        let finished = std::mem::take(self);
        match finished {
            SelectionWizard::Presenting(p) => WizardStep::Complete(p.selections),
            SelectionWizard::Inactive => WizardStep::Invalid,
        }
    }
}
