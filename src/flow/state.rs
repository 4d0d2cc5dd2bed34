//! Wizard state and the persisted user record
//!
//! `UserRecord` and `Draft` are what goes to storage; everything else in
//! `WizardState` is session-only.

use serde::{Deserialize, Serialize};

use super::validate::validate_names;
use crate::certificate::Certificate;

/// Which screen is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    /// Name entry form
    #[default]
    Entry,
    /// Gender selection and the yes/no commitment choice
    Decision,
    /// Certificate
    Result,
}

impl Screen {
    /// DOM id of the section for this screen
    pub fn element_id(&self) -> &'static str {
        match self {
            Screen::Entry => "entry-screen",
            Screen::Decision => "decision-screen",
            Screen::Result => "result-screen",
        }
    }

    pub const ALL: [Screen; 3] = [Screen::Entry, Screen::Decision, Screen::Result];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "male")]
    Male,
    #[serde(rename = "female")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unset => "",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// The single user record kept per browser profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub commitment: bool,
}

impl UserRecord {
    /// True once both names have been accepted
    pub fn is_registered(&self) -> bool {
        validate_names(&self.first_name, &self.last_name).is_valid()
    }

    /// Names are both empty or both valid
    pub fn names_consistent(&self) -> bool {
        (self.first_name.is_empty() && self.last_name.is_empty()) || self.is_registered()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Entry form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameField {
    First,
    Last,
}

impl NameField {
    pub fn input_id(&self) -> &'static str {
        match self {
            NameField::First => "first-name",
            NameField::Last => "last-name",
        }
    }

    pub fn error_id(&self) -> &'static str {
        match self {
            NameField::First => "first-name-error",
            NameField::Last => "last-name-error",
        }
    }
}

/// Raw entry form contents (autosaved, never validated)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty()
    }

    pub fn field(&self, field: NameField) -> &str {
        match field {
            NameField::First => &self.first_name,
            NameField::Last => &self.last_name,
        }
    }

    pub fn set_field(&mut self, field: NameField, value: String) {
        match field {
            NameField::First => self.first_name = value,
            NameField::Last => self.last_name = value,
        }
    }
}

/// Sub-phase of the decision screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionPhase {
    /// Yes/no controls enabled
    #[default]
    Open,
    /// User said "no"; controls suspended behind the reconsider prompt
    Declined,
    /// User said "yes"; waiting for the processing delay with this ticket
    Processing { ticket: u32 },
}

/// Complete wizard state
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    /// Current screen
    pub screen: Screen,
    /// The user record (mirrors storage)
    pub record: UserRecord,
    /// Entry form contents
    pub draft: Draft,
    /// Decision sub-phase
    pub phase: DecisionPhase,
    /// Derived certificate, present on the result screen
    pub certificate: Option<Certificate>,
    /// Restart asked for but not yet confirmed
    pub restart_pending: bool,
    /// Debounce generations per field (first, last)
    pub(crate) draft_generation: [u32; 2],
    /// Next processing ticket
    next_ticket: u32,
}

impl WizardState {
    /// Fresh state on the entry screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a processing ticket, invalidating any earlier one
    pub fn next_ticket(&mut self) -> u32 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }

    /// Bump and return the debounce generation for a field
    pub(crate) fn bump_generation(&mut self, field: NameField) -> u32 {
        let slot = &mut self.draft_generation[field as usize];
        *slot = slot.wrapping_add(1);
        *slot
    }

    pub(crate) fn generation(&self, field: NameField) -> u32 {
        self.draft_generation[field as usize]
    }

    /// True while the yes/no controls must ignore input
    pub fn is_processing(&self) -> bool {
        matches!(self.phase, DecisionPhase::Processing { .. })
    }

    /// Return to the entry screen with everything cleared.
    ///
    /// The ticket counter survives so a delay scheduled before the reset
    /// can never match afterwards.
    pub fn reset(&mut self) {
        let ticket = self.next_ticket();
        let generation = self.draft_generation.map(|g| g.wrapping_add(1));
        *self = Self {
            draft_generation: generation,
            next_ticket: ticket,
            ..Self::default()
        };
    }
}
