use super::{Capabilities, CreateSiteArgs, CreateSiteOutcome, Indicator, SubscriptionRecord};

pub const ACTION_LABEL: &str = "Create Site";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";
pub const FREEZE_MESSAGE: &str = "Creating site...";
pub const DEFAULT_SUCCESS_MESSAGE: &str =
    "Site creation initiated. You will receive an email shortly.";
pub const DEFAULT_ERROR_MESSAGE: &str = "Error creating site";

/// When the action is offered on a record's view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisibilityPolicy {
    Always,
    SavedOnly,
    #[default]
    LocalOnly,
}

impl VisibilityPolicy {
    fn allows(&self, record: &SubscriptionRecord) -> bool {
        match self {
            VisibilityPolicy::Always => true,
            VisibilityPolicy::SavedOnly => !record.is_local,
            VisibilityPolicy::LocalOnly => record.is_local,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TriggerOptions {
    pub visibility: VisibilityPolicy,
    pub validate_required: bool,
    pub freeze_message: Option<String>,
    pub success_message: String,
    pub reload_on_success: bool,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            visibility: VisibilityPolicy::default(),
            validate_required: true,
            freeze_message: Some(FREEZE_MESSAGE.into()),
            success_message: DEFAULT_SUCCESS_MESSAGE.into(),
            reload_on_success: true,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Required fields were missing; the procedure was not called.
    Rejected { missing: Vec<&'static str> },
    Succeeded { reloaded: Option<SubscriptionRecord> },
    Failed { message: String },
}

/// Runs on every render of a record's view. Returns the action to attach, or
/// `None` when the visibility policy hides it for this record.
pub fn register_action(
    record: &SubscriptionRecord,
    options: &TriggerOptions,
) -> Option<CreateSiteAction> {
    options.visibility.allows(record).then(|| CreateSiteAction {
        options: options.clone(),
    })
}

#[derive(Clone, Debug)]
pub struct CreateSiteAction {
    options: TriggerOptions,
}

impl CreateSiteAction {
    pub fn label(&self) -> &'static str {
        ACTION_LABEL
    }

    /// Handles a click on the action. `record` is the state of the record at
    /// the moment of the click, which may differ from the one it was
    /// registered for.
    #[tracing::instrument(
        name = "Activate create site action",
        skip(self, record, capabilities),
        fields(subdomain = ?record.subdomain, plan = ?record.plan)
    )]
    pub async fn activate(
        &self,
        record: &SubscriptionRecord,
        capabilities: &Capabilities<'_>,
    ) -> ActivationOutcome {
        if self.options.validate_required {
            let missing = record.missing_fields();
            if !missing.is_empty() {
                tracing::info!(?missing, "Required fields are missing");
                capabilities.ui.msgprint(REQUIRED_FIELDS_MESSAGE);
                return ActivationOutcome::Rejected { missing };
            }
        }

        let args = CreateSiteArgs::from(record);

        if let Some(message) = &self.options.freeze_message {
            capabilities.ui.freeze(message);
        }
        let payload = capabilities.remote.create_site(&args).await;
        if self.options.freeze_message.is_some() {
            capabilities.ui.unfreeze();
        }

        match CreateSiteOutcome::from(payload) {
            CreateSiteOutcome::Success => {
                capabilities
                    .ui
                    .show_alert(&self.options.success_message, Indicator::Green);
                let reloaded = if self.options.reload_on_success {
                    self.reload(record, capabilities).await
                } else {
                    None
                };
                ActivationOutcome::Succeeded { reloaded }
            }
            CreateSiteOutcome::Failure { message } => {
                let message = message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.into());
                capabilities.ui.show_alert(&message, Indicator::Red);
                ActivationOutcome::Failed { message }
            }
        }
    }

    async fn reload(
        &self,
        record: &SubscriptionRecord,
        capabilities: &Capabilities<'_>,
    ) -> Option<SubscriptionRecord> {
        match capabilities.reloader.reload(record).await {
            Ok(reloaded) => Some(reloaded),
            Err(e) => {
                tracing::warn!(
                    error_cause_chain = ?e,
                    error.message = %e,
                    "Failed to reload the record after site creation"
                );
                None
            }
        }
    }
}
