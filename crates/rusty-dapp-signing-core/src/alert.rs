//! Scam/phishing verification banner model.

pub const SCAM_HELP_LINK: &str = "https://multiversx.com/faq";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationInfo {
    pub url: String,
    /// Human readable, e.g. "24 hours".
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScamPhishingAlert {
    pub url: String,
    pub authorization: Option<AuthorizationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertView {
    /// Shown after a bold `https://` prefix.
    pub verification_url: String,
    pub confirmation: Option<ConfirmationPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPanel {
    pub authorized_url: String,
    pub duration: String,
    pub help_link: &'static str,
}

impl ScamPhishingAlert {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, url: impl Into<String>, duration: impl Into<String>) -> Self {
        self.authorization = Some(AuthorizationInfo {
            url: url.into(),
            duration: duration.into(),
        });
        self
    }

    pub fn view(&self) -> AlertView {
        let confirmation = self
            .authorization
            .as_ref()
            .filter(|auth| !auth.url.is_empty())
            .map(|auth| ConfirmationPanel {
                authorized_url: sanitize_url(&auth.url),
                duration: auth.duration.clone(),
                help_link: SCAM_HELP_LINK,
            });
        AlertView {
            verification_url: sanitize_url(&self.url),
            confirmation,
        }
    }
}

/// Drops one leading `https://` and at most one trailing slash.
pub fn sanitize_url(url: &str) -> String {
    let without_scheme = url.strip_prefix("https://").unwrap_or(url);
    without_scheme
        .strip_suffix('/')
        .unwrap_or(without_scheme)
        .to_owned()
}
