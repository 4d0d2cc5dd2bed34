//! Event handling
//!
//! `step` advances the wizard by one user or timer event and returns the
//! effects the controller and presentation driver must carry out.

use std::time::Duration;

use chrono::NaiveDate;

use super::state::{DecisionPhase, Draft, Gender, NameField, Screen, UserRecord, WizardState};
use super::validate::validate_names;
use crate::certificate::Certificate;
use crate::consts::*;
use crate::error::ValidationError;

/// Input events (one per DOM event or timer callback)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keystroke in a name input
    Input { field: NameField, value: String },
    /// Debounce window elapsed for a field
    DraftIdle { field: NameField, generation: u32 },
    /// Entry form submitted
    Submit { first_name: String, last_name: String },
    /// Gender radio changed
    SelectGender(Gender),
    /// "Yes"
    Commit,
    /// "No"
    Decline,
    /// Back to the yes/no choice after declining
    Reconsider,
    /// Simulated processing finished
    ProcessingElapsed { ticket: u32 },
    /// Start over button
    RequestRestart,
    /// Start over confirmed
    ConfirmRestart,
    /// Start over dismissed
    CancelRestart,
}

/// State of the yes/no controls on the decision screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionControls {
    /// Yes/no buttons clickable
    pub enabled: bool,
    /// "Are you sure?" prompt with the reconsider button visible
    pub decline_prompt: bool,
    /// Loading indicator visible
    pub loading: bool,
}

impl DecisionControls {
    pub const OPEN: Self = Self {
        enabled: true,
        decline_prompt: false,
        loading: false,
    };

    pub fn for_phase(phase: DecisionPhase) -> Self {
        match phase {
            DecisionPhase::Open => Self::OPEN,
            DecisionPhase::Declined => Self {
                enabled: false,
                decline_prompt: true,
                loading: false,
            },
            DecisionPhase::Processing { .. } => Self {
                enabled: false,
                decline_prompt: false,
                loading: true,
            },
        }
    }
}

/// Side effects requested by a step
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Make this screen the only visible one
    Show(Screen),
    /// Set or clear the inline error for a field
    FieldStatus {
        field: NameField,
        error: Option<ValidationError>,
    },
    /// Fill the entry inputs
    Prefill(Draft),
    /// Update the decision screen controls
    Controls(DecisionControls),
    /// Reflect the selected gender
    GenderSelected(Gender),
    /// Write the record to storage
    Persist(UserRecord),
    /// Write the entry form draft to storage
    PersistDraft(Draft),
    /// Remove record and draft from storage
    ClearPersisted,
    /// Deliver `event` back to `step` after `after`
    Schedule { after: Duration, event: Event },
    /// Start the confetti show
    Celebrate,
    /// Populate the certificate
    Certificate(Certificate),
    /// Ask the user to confirm starting over
    PromptRestart,
}

/// Advance the wizard by one event
pub fn step(state: &mut WizardState, event: Event, today: NaiveDate) -> Vec<Effect> {
    let mut effects = Vec::new();

    match event {
        Event::Input { field, value } => {
            if state.screen != Screen::Entry {
                return ignored(state, "input");
            }
            state.draft.set_field(field, value);
            let generation = state.bump_generation(field);
            effects.push(Effect::Schedule {
                after: AUTOSAVE_DEBOUNCE,
                event: Event::DraftIdle { field, generation },
            });
        }

        Event::DraftIdle { field, generation } => {
            // Superseded by a later keystroke, or the form is gone
            if state.screen != Screen::Entry || generation != state.generation(field) {
                return effects;
            }
            effects.push(Effect::PersistDraft(state.draft.clone()));
        }

        Event::Submit {
            first_name,
            last_name,
        } => {
            if state.screen != Screen::Entry {
                return ignored(state, "submit");
            }
            let check = validate_names(&first_name, &last_name);
            effects.push(Effect::FieldStatus {
                field: NameField::First,
                error: check.first.err(),
            });
            effects.push(Effect::FieldStatus {
                field: NameField::Last,
                error: check.last.err(),
            });

            state.draft = Draft {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
            };
            if !check.is_valid() {
                log::debug!("Entry form rejected: {:?}", check);
                return effects;
            }

            state.record.first_name = first_name.trim().to_string();
            state.record.last_name = last_name.trim().to_string();
            state.draft = Draft::default();
            // Pending autosaves must not resurrect the draft
            state.bump_generation(NameField::First);
            state.bump_generation(NameField::Last);
            state.screen = Screen::Decision;
            state.phase = DecisionPhase::Open;

            log::info!("Registered {}", state.record.full_name());
            effects.push(Effect::Persist(state.record.clone()));
            effects.push(Effect::PersistDraft(Draft::default()));
            effects.push(Effect::Show(Screen::Decision));
            effects.push(Effect::GenderSelected(state.record.gender));
            effects.push(Effect::Controls(DecisionControls::OPEN));
        }

        Event::SelectGender(gender) => {
            if state.screen != Screen::Decision || state.is_processing() {
                return ignored(state, "gender selection");
            }
            state.record.gender = gender;
            effects.push(Effect::GenderSelected(gender));
            effects.push(Effect::Persist(state.record.clone()));
        }

        Event::Commit => {
            if state.screen != Screen::Decision || state.phase != DecisionPhase::Open {
                return ignored(state, "commit");
            }
            state.record.commitment = true;
            let ticket = state.next_ticket();
            state.phase = DecisionPhase::Processing { ticket };

            log::info!("Commitment confirmed (ticket {})", ticket);
            effects.push(Effect::Persist(state.record.clone()));
            effects.push(Effect::Controls(DecisionControls::for_phase(state.phase)));
            effects.push(Effect::Celebrate);
            effects.push(Effect::Schedule {
                after: PROCESSING_DELAY,
                event: Event::ProcessingElapsed { ticket },
            });
        }

        Event::Decline => {
            if state.screen != Screen::Decision || state.phase != DecisionPhase::Open {
                return ignored(state, "decline");
            }
            state.phase = DecisionPhase::Declined;
            effects.push(Effect::Controls(DecisionControls::for_phase(state.phase)));
        }

        Event::Reconsider => {
            if state.screen != Screen::Decision || state.phase != DecisionPhase::Declined {
                return ignored(state, "reconsider");
            }
            state.phase = DecisionPhase::Open;
            effects.push(Effect::Controls(DecisionControls::OPEN));
        }

        Event::ProcessingElapsed { ticket } => {
            if state.phase != (DecisionPhase::Processing { ticket }) {
                log::debug!("Dropping stale processing ticket {}", ticket);
                return effects;
            }
            let certificate = Certificate::derive(&state.record, today);
            state.phase = DecisionPhase::Open;
            state.screen = Screen::Result;
            state.certificate = Some(certificate.clone());

            effects.push(Effect::Certificate(certificate));
            effects.push(Effect::Controls(DecisionControls::OPEN));
            effects.push(Effect::Show(Screen::Result));
        }

        Event::RequestRestart => {
            state.restart_pending = true;
            effects.push(Effect::PromptRestart);
        }

        Event::CancelRestart => {
            state.restart_pending = false;
        }

        Event::ConfirmRestart => {
            if !state.restart_pending {
                return ignored(state, "unrequested restart");
            }
            state.reset();
            log::info!("Wizard restarted");

            effects.push(Effect::ClearPersisted);
            effects.push(Effect::Prefill(Draft::default()));
            effects.push(Effect::FieldStatus {
                field: NameField::First,
                error: None,
            });
            effects.push(Effect::FieldStatus {
                field: NameField::Last,
                error: None,
            });
            effects.push(Effect::GenderSelected(Gender::Unset));
            effects.push(Effect::Controls(DecisionControls::OPEN));
            effects.push(Effect::Show(Screen::Entry));
        }
    }

    effects
}

/// Build the state and initial effects for a previously stored session
pub fn resume(
    record: Option<UserRecord>,
    draft: Option<Draft>,
    today: NaiveDate,
) -> (WizardState, Vec<Effect>) {
    let mut state = WizardState::new();
    let mut effects = Vec::new();

    match record {
        Some(record) if record.is_registered() => {
            state.record = record;
            if state.record.commitment {
                let certificate = Certificate::derive(&state.record, today);
                state.certificate = Some(certificate.clone());
                state.screen = Screen::Result;
                effects.push(Effect::Certificate(certificate));
            } else {
                state.screen = Screen::Decision;
                effects.push(Effect::Controls(DecisionControls::OPEN));
            }
            effects.push(Effect::GenderSelected(state.record.gender));
            log::info!("Resumed {} at {:?}", state.record.full_name(), state.screen);
        }
        Some(_) => {
            log::warn!("Stored record has invalid names, starting fresh");
        }
        None => {}
    }

    if state.screen == Screen::Entry {
        if let Some(draft) = draft.filter(|d| !d.is_empty()) {
            state.draft = draft;
            effects.push(Effect::Prefill(state.draft.clone()));
        }
    }

    effects.push(Effect::Show(state.screen));
    (state, effects)
}

fn ignored(state: &WizardState, what: &str) -> Vec<Effect> {
    log::debug!(
        "Ignoring {} on {:?} ({:?})",
        what,
        state.screen,
        state.phase
    );
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn submit(first: &str, last: &str) -> Event {
        Event::Submit {
            first_name: first.into(),
            last_name: last.into(),
        }
    }

    /// Run a submit that must succeed
    fn registered(first: &str, last: &str) -> WizardState {
        let mut state = WizardState::new();
        step(&mut state, submit(first, last), today());
        assert_eq!(state.screen, Screen::Decision);
        state
    }

    /// Pull the scheduled event out of an effect list
    fn scheduled(effects: &[Effect]) -> (Duration, Event) {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Schedule { after, event } => Some((*after, event.clone())),
                _ => None,
            })
            .expect("no scheduled event")
    }

    #[test]
    fn test_submit_valid_names() {
        let mut state = WizardState::new();
        let effects = step(&mut state, submit(" Jo ", "Smith"), today());

        assert_eq!(state.screen, Screen::Decision);
        assert_eq!(state.record.first_name, "Jo");
        assert_eq!(state.record.last_name, "Smith");
        assert!(state.record.names_consistent());
        assert!(effects.contains(&Effect::Persist(state.record.clone())));
        assert!(effects.contains(&Effect::Show(Screen::Decision)));
        assert!(effects.contains(&Effect::FieldStatus {
            field: NameField::First,
            error: None
        }));
    }

    #[test]
    fn test_single_letter_last_name_is_rejected() {
        let mut state = WizardState::new();
        let effects = step(&mut state, submit("Jo", "X"), today());

        assert_eq!(state.screen, Screen::Entry);
        assert!(effects.contains(&Effect::FieldStatus {
            field: NameField::First,
            error: None
        }));
        assert!(effects.contains(&Effect::FieldStatus {
            field: NameField::Last,
            error: Some(ValidationError::TooShort)
        }));
    }

    #[test]
    fn test_submit_missing_first_name() {
        let mut state = WizardState::new();
        let effects = step(&mut state, submit("", "Smith"), today());

        assert_eq!(state.screen, Screen::Entry);
        assert_eq!(state.record, UserRecord::default());
        assert_eq!(
            effects,
            vec![
                Effect::FieldStatus {
                    field: NameField::First,
                    error: Some(ValidationError::Required)
                },
                Effect::FieldStatus {
                    field: NameField::Last,
                    error: None
                },
            ]
        );
    }

    #[test]
    fn test_decline_then_reconsider() {
        let mut state = registered("Jo", "Smith");

        step(&mut state, Event::SelectGender(Gender::Male), today());
        assert_eq!(state.record.gender, Gender::Male);

        let effects = step(&mut state, Event::Decline, today());
        assert_eq!(state.phase, DecisionPhase::Declined);
        assert!(!state.record.commitment);
        assert!(!effects.iter().any(|e| matches!(e, Effect::Persist(_))));

        // Yes is suspended behind the prompt
        assert!(step(&mut state, Event::Commit, today()).is_empty());
        assert!(!state.record.commitment);

        let effects = step(&mut state, Event::Reconsider, today());
        assert_eq!(effects, vec![Effect::Controls(DecisionControls::OPEN)]);
        assert_eq!(state.screen, Screen::Decision);
        assert_eq!(state.phase, DecisionPhase::Open);
        assert!(!state.record.commitment);
    }

    #[test]
    fn test_commit_reaches_result_after_delay() {
        let mut state = registered("Jo", "Smith");
        step(&mut state, Event::SelectGender(Gender::Female), today());

        let effects = step(&mut state, Event::Commit, today());
        assert!(state.record.commitment);
        assert!(state.is_processing());
        assert_eq!(state.screen, Screen::Decision);
        assert!(effects.contains(&Effect::Celebrate));
        assert!(effects.contains(&Effect::Persist(state.record.clone())));

        let (after, event) = scheduled(&effects);
        assert_eq!(after, PROCESSING_DELAY);

        let effects = step(&mut state, event, today());
        assert_eq!(state.screen, Screen::Result);
        let certificate = state.certificate.clone().unwrap();
        assert_eq!(certificate.full_name, "Jo Smith");
        assert_eq!(certificate.issued_on, "October 17, 2026");
        assert_eq!(effects.last(), Some(&Effect::Show(Screen::Result)));
    }

    #[test]
    fn test_controls_ignored_while_processing() {
        let mut state = registered("Jo", "Smith");
        let effects = step(&mut state, Event::Commit, today());
        let (_, elapsed) = scheduled(&effects);

        assert!(step(&mut state, Event::Commit, today()).is_empty());
        assert!(step(&mut state, Event::Decline, today()).is_empty());
        assert!(step(&mut state, Event::SelectGender(Gender::Male), today()).is_empty());
        assert_eq!(state.record.gender, Gender::Unset);

        step(&mut state, elapsed.clone(), today());
        assert_eq!(state.screen, Screen::Result);

        // A duplicate completion changes nothing
        assert!(step(&mut state, elapsed, today()).is_empty());
        assert_eq!(state.screen, Screen::Result);
    }

    #[test]
    fn test_stale_ticket_after_restart() {
        let mut state = registered("Jo", "Smith");
        let effects = step(&mut state, Event::Commit, today());
        let (_, elapsed) = scheduled(&effects);

        step(&mut state, Event::RequestRestart, today());
        step(&mut state, Event::ConfirmRestart, today());
        assert_eq!(state.screen, Screen::Entry);

        assert!(step(&mut state, elapsed, today()).is_empty());
        assert_eq!(state.screen, Screen::Entry);
        assert!(state.certificate.is_none());
    }

    #[test]
    fn test_restart_from_result() {
        let mut state = registered("Jo", "Smith");
        step(&mut state, Event::SelectGender(Gender::Female), today());
        let (_, elapsed) = scheduled(&step(&mut state, Event::Commit, today()));
        step(&mut state, elapsed, today());
        assert_eq!(state.screen, Screen::Result);

        let effects = step(&mut state, Event::RequestRestart, today());
        assert_eq!(effects, vec![Effect::PromptRestart]);
        assert_eq!(state.screen, Screen::Result);

        let effects = step(&mut state, Event::ConfirmRestart, today());
        assert_eq!(state.screen, Screen::Entry);
        assert_eq!(state.record, UserRecord::default());
        assert!(state.certificate.is_none());
        assert!(effects.contains(&Effect::ClearPersisted));
        assert!(effects.contains(&Effect::GenderSelected(Gender::Unset)));
        assert!(effects.contains(&Effect::Show(Screen::Entry)));
    }

    #[test]
    fn test_restart_requires_confirmation() {
        let mut state = registered("Jo", "Smith");
        assert!(step(&mut state, Event::ConfirmRestart, today()).is_empty());
        assert_eq!(state.screen, Screen::Decision);

        step(&mut state, Event::RequestRestart, today());
        step(&mut state, Event::CancelRestart, today());
        assert!(step(&mut state, Event::ConfirmRestart, today()).is_empty());
        assert_eq!(state.record.first_name, "Jo");
    }

    #[test]
    fn test_restart_from_any_state() {
        let starts = [
            WizardState::new(),
            registered("Jo", "Smith"),
            {
                let mut s = registered("Ann", "Lee");
                step(&mut s, Event::Decline, today());
                s
            },
        ];
        for mut state in starts {
            step(&mut state, Event::RequestRestart, today());
            step(&mut state, Event::ConfirmRestart, today());
            assert_eq!(state.screen, Screen::Entry);
            assert_eq!(state.record, UserRecord::default());
            assert_eq!(state.phase, DecisionPhase::Open);
        }
    }

    #[test]
    fn test_debounce_only_last_keystroke_saves() {
        let mut state = WizardState::new();
        let mut pending = Vec::new();
        for value in ["J", "Jo", "Jon"] {
            let effects = step(
                &mut state,
                Event::Input {
                    field: NameField::First,
                    value: value.into(),
                },
                today(),
            );
            pending.push(scheduled(&effects).1);
        }

        let saves: Vec<_> = pending
            .into_iter()
            .flat_map(|event| step(&mut state, event, today()))
            .collect();
        assert_eq!(
            saves,
            vec![Effect::PersistDraft(Draft {
                first_name: "Jon".into(),
                last_name: String::new(),
            })]
        );
    }

    #[test]
    fn test_pending_autosave_dropped_after_submit() {
        let mut state = WizardState::new();
        let effects = step(
            &mut state,
            Event::Input {
                field: NameField::Last,
                value: "Smith".into(),
            },
            today(),
        );
        let (_, idle) = scheduled(&effects);
        step(&mut state, submit("Jo", "Smith"), today());
        assert!(step(&mut state, idle, today()).is_empty());
    }

    #[test]
    fn test_resume_committed_record() {
        let record = UserRecord {
            first_name: "Jo".into(),
            last_name: "Smith".into(),
            gender: Gender::Female,
            commitment: true,
        };
        let (state, effects) = resume(Some(record), None, today());
        assert_eq!(state.screen, Screen::Result);
        assert_eq!(state.certificate.as_ref().unwrap().full_name, "Jo Smith");
        assert_eq!(effects.last(), Some(&Effect::Show(Screen::Result)));
    }

    #[test]
    fn test_resume_registered_record_opens_decision() {
        let record = UserRecord {
            first_name: "Jo".into(),
            last_name: "Smith".into(),
            gender: Gender::Male,
            commitment: false,
        };
        let (state, effects) = resume(Some(record.clone()), None, today());
        assert_eq!(state.screen, Screen::Decision);
        assert_eq!(state.phase, DecisionPhase::Open);
        assert_eq!(state.record, record);
        assert!(state.certificate.is_none());
        assert_eq!(
            effects,
            vec![
                Effect::Controls(DecisionControls::OPEN),
                Effect::GenderSelected(Gender::Male),
                Effect::Show(Screen::Decision),
            ]
        );
    }

    #[test]
    fn test_resume_invalid_record_starts_fresh_with_draft() {
        let record = UserRecord {
            first_name: "J".into(),
            last_name: "Smith".into(),
            ..Default::default()
        };
        let draft = Draft {
            first_name: "Jo".into(),
            last_name: String::new(),
        };
        let (state, effects) = resume(Some(record), Some(draft.clone()), today());
        assert_eq!(state.screen, Screen::Entry);
        assert_eq!(state.record, UserRecord::default());
        assert_eq!(
            effects,
            vec![Effect::Prefill(draft), Effect::Show(Screen::Entry)]
        );
    }
}
