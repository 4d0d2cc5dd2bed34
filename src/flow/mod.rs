//! Wizard state machine
//!
//! All flow logic lives here. This module must stay pure:
//! - No storage access (persistence is requested through effects)
//! - No timers (delays are returned as `Effect::Schedule` directives)
//! - No DOM or platform dependencies

pub mod state;
pub mod step;
pub mod validate;

pub use state::{DecisionPhase, Draft, Gender, NameField, Screen, UserRecord, WizardState};
pub use step::{DecisionControls, Effect, Event, resume, step};
pub use validate::{NameCheck, validate, validate_names};
