use crate::error::RowIssue;
use crate::grade::Grade;
use crate::models::SubjectEntry;

pub const MIN_CREDITS: f64 = 0.0;
pub const MAX_CREDITS: f64 = 5.0;

/// A row whose raw text has been parsed once and for all.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntry {
    pub credits: f64,
    pub grade: Grade,
    pub display_name: String,
}

pub fn display_name(entry: &SubjectEntry) -> String {
    let name = entry.name.trim();
    if name.is_empty() {
        format!("Subject {}", entry.number)
    } else {
        name.to_string()
    }
}

pub fn validate_entry(entry: &SubjectEntry) -> Result<ValidEntry, RowIssue> {
    let subject = display_name(entry);
    let credits_raw = entry.credits.trim();
    let grade_raw = entry.grade.trim();

    if credits_raw.is_empty() {
        return Err(RowIssue::EmptyCredits { subject });
    }

    if grade_raw.is_empty() {
        return Err(RowIssue::EmptyGrade { subject });
    }

    let credits = match credits_raw.parse::<f64>() {
        Ok(value) if value.is_finite() && (MIN_CREDITS..=MAX_CREDITS).contains(&value) => value,
        _ => return Err(RowIssue::CreditsOutOfRange { subject }),
    };

    let Some(grade) = Grade::parse(grade_raw) else {
        return Err(RowIssue::InvalidGrade { subject });
    };

    Ok(ValidEntry {
        credits,
        grade,
        display_name: subject,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: usize, name: &str, credits: &str, grade: &str) -> SubjectEntry {
        SubjectEntry {
            number,
            name: name.to_string(),
            credits: credits.to_string(),
            grade: grade.to_string(),
            ..SubjectEntry::default()
        }
    }

    #[test]
    fn blank_name_falls_back_to_position() {
        assert_eq!(display_name(&entry(4, "  ", "3", "A")), "Subject 4");
        assert_eq!(display_name(&entry(4, " Chemistry ", "3", "A")), "Chemistry");
    }

    #[test]
    fn normalizes_credits_and_grade() {
        let valid = validate_entry(&entry(1, "Maths", " 4.5 ", "a+")).unwrap();
        assert_eq!(valid.credits, 4.5);
        assert_eq!(valid.grade, Grade::APlus);
        assert_eq!(valid.display_name, "Maths");
    }

    #[test]
    fn credit_bounds_are_inclusive() {
        assert!(validate_entry(&entry(1, "", "0", "O")).is_ok());
        assert!(validate_entry(&entry(1, "", "5", "O")).is_ok());
        assert_eq!(
            validate_entry(&entry(1, "", "5.01", "O")),
            Err(RowIssue::CreditsOutOfRange {
                subject: "Subject 1".to_string()
            })
        );
        assert!(validate_entry(&entry(1, "", "-1", "O")).is_err());
    }

    #[test]
    fn non_numeric_credits_are_out_of_range() {
        for raw in ["four", "NaN", "inf", "3 credits"] {
            assert!(
                matches!(
                    validate_entry(&entry(2, "", raw, "A")),
                    Err(RowIssue::CreditsOutOfRange { .. })
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn first_failing_rule_wins() {
        assert!(matches!(
            validate_entry(&entry(1, "", "", "")),
            Err(RowIssue::EmptyCredits { .. })
        ));
        assert!(matches!(
            validate_entry(&entry(1, "", "9", "")),
            Err(RowIssue::EmptyGrade { .. })
        ));
        assert!(matches!(
            validate_entry(&entry(1, "", "9", "Z")),
            Err(RowIssue::CreditsOutOfRange { .. })
        ));
        assert!(matches!(
            validate_entry(&entry(1, "", "3", "Z")),
            Err(RowIssue::InvalidGrade { .. })
        ));
    }
}
