use regex::{Captures, Regex};

use serde::Deserialize;

use crate::client::Email;
use crate::domain::EmailAddress;

/// Subject and plain-text body of an outgoing email.
///
/// Both may contain `{name}` placeholders which are substituted on render.
/// Unknown placeholders are left untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub text: String,
}

impl EmailTemplate {
    pub fn render(&self, recipient: EmailAddress, vars: &[(&str, &str)]) -> Email {
        Email {
            recipient,
            subject: substitute(&self.subject, vars),
            text_body: substitute(&self.text, vars),
        }
    }
}

/// The set of templates the application sends
#[derive(Debug, Clone, Deserialize)]
pub struct EmailTemplates {
    pub confirmation: EmailTemplate,
    pub confirmation_successful: EmailTemplate,
    pub unsubscribe: EmailTemplate,
    pub weather: EmailTemplate,
}

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{(\w+)\}").unwrap();
}

/// Substitute in one pass, values are never rescanned for placeholders
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
