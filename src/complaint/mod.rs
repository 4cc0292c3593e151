/// Complaint composer for the landing page.
///
/// Validates the complaint form and builds a pre-filled Gmail compose URL
/// plus a `mailto:` fallback. Nothing is sent server-side; the customer
/// reviews and sends the message from their own mail client.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ComplaintConfig;

/// Loose `local@domain.tld` check.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"));

const GMAIL_COMPOSE: &str = "https://mail.google.com/mail/?view=cm&fs=1";

/// Shown after the compose links are produced.
pub const SUCCESS_MESSAGE: &str = "Gmail will open in a new window. Please review and send the email \
                                   to complete your complaint submission.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComplaintError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// Complaint form as submitted. Values are trimmed before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplaintForm {
    pub personal_email: String,
    pub customer_name: String,
    pub company_name: String,
    pub phone_number: String,
    pub problem_description: String,
}

/// A validated complaint ready to be composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Complaint {
    pub email: String,
    pub name: String,
    pub company: String,
    pub phone: Option<String>,
    pub description: String,
}

impl ComplaintForm {
    pub fn validate(&self) -> Result<Complaint, ComplaintError> {
        let email = self.personal_email.trim();
        let name = self.customer_name.trim();
        let company = self.company_name.trim();
        let phone = self.phone_number.trim();
        let description = self.problem_description.trim();

        if email.is_empty() || name.is_empty() || company.is_empty() || description.is_empty() {
            return Err(ComplaintError::MissingFields);
        }
        if !EMAIL_RE.is_match(email) {
            return Err(ComplaintError::InvalidEmail);
        }

        Ok(Complaint {
            email: email.to_string(),
            name: name.to_string(),
            company: company.to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            description: description.to_string(),
        })
    }
}

/// Compose links for a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub gmail_url: String,
    pub mailto_url: String,
}

impl Complaint {
    pub fn subject(&self) -> String {
        format!("Complaint: {}", self.company)
    }

    pub fn body(&self, team_name: &str) -> String {
        let phone_line = self
            .phone
            .as_deref()
            .map(|p| format!("- Phone: {p}"))
            .unwrap_or_default();

        format!(
            "Dear {team_name} Team,\n\
             \n\
             I would like to raise a complaint regarding {company}.\n\
             \n\
             Customer Information:\n\
             - Name: {name}\n\
             - Email: {email}\n\
             {phone_line}\n\
             \n\
             Problem Description:\n\
             {description}\n\
             \n\
             Please process this complaint and ensure it reaches the appropriate team for resolution.\n\
             \n\
             Thank you,\n\
             {name}",
            company = self.company,
            name = self.name,
            email = self.email,
            description = self.description,
        )
    }

    pub fn compose(&self, config: &ComplaintConfig) -> ComposedMail {
        let subject = self.subject();
        let body = self.body(&config.team_name);
        let encoded_subject = urlencoding::encode(&subject);
        let encoded_body = urlencoding::encode(&body);

        let gmail_url = format!(
            "{GMAIL_COMPOSE}&to={}&su={encoded_subject}&body={encoded_body}",
            config.target_email
        );
        let mailto_url = format!(
            "mailto:{}?subject={encoded_subject}&body={encoded_body}&reply-to={}",
            config.target_email,
            urlencoding::encode(&self.email)
        );

        ComposedMail {
            to: config.target_email.clone(),
            subject,
            body,
            gmail_url,
            mailto_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ComplaintForm {
        ComplaintForm {
            personal_email: " ada@example.com ".into(),
            customer_name: "Ada".into(),
            company_name: "Acme & Co".into(),
            phone_number: String::new(),
            problem_description: "Refund never arrived".into(),
        }
    }

    #[test]
    fn missing_required_field() {
        let mut f = form();
        f.company_name = "   ".into();
        assert_eq!(f.validate(), Err(ComplaintError::MissingFields));
        assert_eq!(
            ComplaintError::MissingFields.to_string(),
            "Please fill in all required fields."
        );
    }

    #[test]
    fn invalid_email() {
        for email in ["ada", "ada@example", "ada @example.com", "@example.com"] {
            let mut f = form();
            f.personal_email = email.into();
            assert_eq!(f.validate(), Err(ComplaintError::InvalidEmail), "{email}");
        }
    }

    #[test]
    fn phone_is_optional() {
        let complaint = form().validate().unwrap();
        assert_eq!(complaint.email, "ada@example.com");
        assert!(complaint.phone.is_none());
        assert!(!complaint.body("Team").contains("- Phone:"));

        let mut f = form();
        f.phone_number = "555-0100".into();
        let body = f.validate().unwrap().body("Team");
        assert!(body.contains("- Email: ada@example.com\n- Phone: 555-0100\n\nProblem Description:"));
    }

    #[test]
    fn body_follows_letter_template() {
        let body = form().validate().unwrap().body("CarePilot");
        assert!(body.starts_with("Dear CarePilot Team,\n\nI would like to raise a complaint regarding Acme & Co.\n"));
        assert!(body.ends_with("Thank you,\nAda"));
    }

    #[test]
    fn compose_urls_are_encoded() {
        let config = ComplaintConfig::default();
        let mail = form().validate().unwrap().compose(&config);

        assert_eq!(mail.subject, "Complaint: Acme & Co");
        assert!(mail.gmail_url.starts_with(
            "https://mail.google.com/mail/?view=cm&fs=1&to=reachus.sherlox@gmail.com&su=Complaint%3A%20Acme%20%26%20Co&body=Dear%20"
        ));
        assert!(mail.mailto_url.starts_with("mailto:reachus.sherlox@gmail.com?subject=Complaint%3A%20Acme%20%26%20Co"));
        assert!(mail.mailto_url.ends_with("&reply-to=ada%40example.com"));
        assert!(!mail.gmail_url.contains('\n'));
    }

    #[test]
    fn form_deserializes_from_camel_case_json() {
        let f: ComplaintForm = serde_json::from_str(
            r#"{"personalEmail":"a@b.io","customerName":"A","companyName":"C","problemDescription":"D"}"#,
        )
        .unwrap();
        assert_eq!(f.phone_number, "");
        assert!(f.validate().is_ok());
    }
}
