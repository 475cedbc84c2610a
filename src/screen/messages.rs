//! User-facing alert copy.

use crate::routing::{RegistrationOutcome, SubmissionOutcome};

/// Title and body of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: String,
    pub message: String,
}

impl UserMessage {
    pub fn new(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    pub fn report_received(report_id: &str) -> Self {
        Self::new("Tack", &format!("Tack för din rapport. (nr. {})", report_id))
    }

    pub fn report_failed() -> Self {
        Self::new("Fel", "Kunde inte skapa rapport. Försök senare.")
    }

    pub fn registration_failed() -> Self {
        Self::new(
            "Något gick fel",
            "Kunde inte spara dina användaruppgifter. Försök senare.",
        )
    }

    pub fn location_disabled() -> Self {
        Self::new(
            "Platsinformation avstängd",
            "För att detta ska lira behöver vi få information om din plats.",
        )
    }

    pub fn about() -> Self {
        Self::new(
            "Om postnummeruppror",
            "Vi vill skapa en ny postnummerdatabas fri att använda för alla. \
             Samtidigt vill vi visa för politiker att affärsmodellen för postnummer är förlegad. \n\
             Eftersom ursprungskällan till postnummer är skyddad måste vi bygga upp en ny databas \
             från grunden. Vi vill göra det med din hjälp. Genom att rapportera in adressinformation \
             med någon av våra appar kan du bidra till databasen.",
        )
    }
}

impl From<&SubmissionOutcome> for UserMessage {
    fn from(outcome: &SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Success { report_id } => Self::report_received(report_id),
            SubmissionOutcome::ServerRejected
            | SubmissionOutcome::NetworkError
            | SubmissionOutcome::MalformedResponse => Self::report_failed(),
        }
    }
}

/// Failed registrations share one message; success shows none.
pub fn registration_message(outcome: &RegistrationOutcome) -> Option<UserMessage> {
    match outcome {
        RegistrationOutcome::Success(_) => None,
        _ => Some(UserMessage::registration_failed()),
    }
}
