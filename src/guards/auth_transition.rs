use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// NextStep
///
/// Where the client goes after submitting an email. Deliberately a single variant: the
/// type has no way to express "account not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NextStep {
    SignIn,
}

/// MessageKey
///
/// Localization key of the message shown on the sign-in step. Single variant for the
/// same reason as `NextStep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum MessageKey {
    #[serde(rename = "auth.sign_in_generic_prompt")]
    SignInGenericPrompt,
}

/// EmailCheckTransition
///
/// The complete response of the email-check flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EmailCheckTransition {
    pub next_step: NextStep,
    pub message_key: MessageKey,
}

const SIGN_IN_TRANSITION: EmailCheckTransition = EmailCheckTransition {
    next_step: NextStep::SignIn,
    message_key: MessageKey::SignInGenericPrompt,
};

/// next_transition
///
/// Returns the transition shown after every email check, whether or not the account
/// exists. Takes no input and must stay free of branches: callers perform their lookup
/// separately and discard its result before calling this.
pub const fn next_transition() -> EmailCheckTransition {
    SIGN_IN_TRANSITION
}
