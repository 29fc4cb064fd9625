//! The "Create Site" action attached to a site subscription record's view.
//!
//! Registration is a pure function of the record snapshot and the trigger
//! options. Everything the action touches outside of itself (the remote
//! procedure, the user interface and record reloading) is injected through
//! [`Capabilities`], so the whole flow runs without a live UI.

mod action;
mod capabilities;
mod record;
mod response;

pub use action::{
    register_action, ActivationOutcome, CreateSiteAction, TriggerOptions, VisibilityPolicy,
    ACTION_LABEL, DEFAULT_ERROR_MESSAGE, DEFAULT_SUCCESS_MESSAGE, FREEZE_MESSAGE,
    REQUIRED_FIELDS_MESSAGE,
};
pub use capabilities::{
    Capabilities, CreateSiteArgs, Indicator, RecordReloader, RemoteProcedure, Ui,
};
pub use record::SubscriptionRecord;
pub use response::{CreateSiteOutcome, CreateSitePayload, SUCCESS_STATUS};
