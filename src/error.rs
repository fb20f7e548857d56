use thiserror::Error;

/// Why a single subject row was rejected. Only the first failing rule is
/// reported for a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIssue {
    #[error("Empty credits input for {subject}.")]
    EmptyCredits { subject: String },

    #[error("Empty grade input for {subject}.")]
    EmptyGrade { subject: String },

    #[error("Credit value out of range for {subject}; must be between 0 and 5.")]
    CreditsOutOfRange { subject: String },

    #[error("Invalid grade value for {subject}.")]
    InvalidGrade { subject: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpaWarning {
    pub subject_index: usize,
    pub message: String,
}

/// Every row problem found in one calculation, newline-joined in `message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GpaError {
    pub message: String,
    pub warnings: Vec<GpaWarning>,
}

impl GpaError {
    pub fn from_issues(issues: Vec<(usize, RowIssue)>) -> Self {
        let warnings: Vec<GpaWarning> = issues
            .into_iter()
            .map(|(subject_index, issue)| GpaWarning {
                subject_index,
                message: issue.to_string(),
            })
            .collect();

        let message = warnings
            .iter()
            .map(|warning| warning.message.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        GpaError { message, warnings }
    }
}
