use std::fmt;

/// Identity vouched for by a third-party provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: String,
    pub display_name: String,
}

/// Per-request progress of a third-party login.
///
/// `Linked` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthStage {
    AwaitingProviderRedirect,
    AwaitingProviderCallback,
    Exchanging,
    Linked,
    Failed,
}

impl fmt::Display for OAuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OAuthStage::AwaitingProviderRedirect => "awaiting_provider_redirect",
            OAuthStage::AwaitingProviderCallback => "awaiting_provider_callback",
            OAuthStage::Exchanging => "exchanging",
            OAuthStage::Linked => "linked",
            OAuthStage::Failed => "failed",
        };
        f.write_str(name)
    }
}
