use super::domain::{Gender, MemberDraft, MemberSubmission, Occupation};

const MOBILE_DIGITS: usize = 10;
const NATIONAL_ID_DIGITS: usize = 12;
const MAX_AGE: i64 = 150;

/// Field-level validation failure with the human-readable message the form
/// and the admin tooling surface verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Mobile number must be 10 digits")]
    MobileNumberDigits,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("National ID number must be 12 digits")]
    NationalIdDigits,
    #[error("Age must be a whole number")]
    AgeNotNumeric,
    #[error("Age must be between 0 and 150")]
    AgeOutOfRange,
    #[error("Gender must be one of {}", Gender::LABELS)]
    UnknownGender,
    #[error("Occupation must be one of {}", Occupation::LABELS)]
    UnknownOccupation,
}

/// Check and normalize a raw submission.
///
/// Pure function: either every field normalizes cleanly and a draft is
/// returned, or the full ordered list of failures is returned so callers can
/// render every problem at once. Rules are applied independently; one bad
/// field never masks another.
pub fn validate(submission: MemberSubmission) -> Result<MemberDraft, Vec<ValidationFailure>> {
    let mut failures = Vec::new();

    let surname = required_text(submission.surname, "Surname", &mut failures);
    let name = required_text(submission.name, "Name", &mut failures);

    let gender = match submission.gender.as_deref().map(str::trim) {
        None | Some("") => {
            failures.push(ValidationFailure::Missing("Gender"));
            None
        }
        Some(value) => match Gender::from_label(value) {
            Some(gender) => Some(gender),
            None => {
                failures.push(ValidationFailure::UnknownGender);
                None
            }
        },
    };

    let age = match submission.age.as_deref().map(str::trim) {
        None | Some("") => {
            failures.push(ValidationFailure::Missing("Age"));
            None
        }
        Some(value) => match value.parse::<i64>() {
            Err(_) => {
                failures.push(ValidationFailure::AgeNotNumeric);
                None
            }
            Ok(parsed) if !(0..=MAX_AGE).contains(&parsed) => {
                failures.push(ValidationFailure::AgeOutOfRange);
                None
            }
            Ok(parsed) => Some(parsed as u8),
        },
    };

    let mobile_number = digit_field(
        submission.mobile_number,
        "Mobile number",
        MOBILE_DIGITS,
        ValidationFailure::MobileNumberDigits,
        &mut failures,
    );

    let email_address = match submission.email_address.as_deref().map(str::trim) {
        None | Some("") => {
            failures.push(ValidationFailure::Missing("Email address"));
            None
        }
        Some(value) => {
            let normalized = value.to_lowercase();
            if is_valid_email(&normalized) {
                Some(normalized)
            } else {
                failures.push(ValidationFailure::InvalidEmail);
                None
            }
        }
    };

    let national_id_number = digit_field(
        submission.national_id_number,
        "National ID number",
        NATIONAL_ID_DIGITS,
        ValidationFailure::NationalIdDigits,
        &mut failures,
    );

    let village = required_text(submission.village, "Village/City", &mut failures);

    let occupation = match submission.occupation.as_deref().map(str::trim) {
        None | Some("") => {
            failures.push(ValidationFailure::Missing("Occupation"));
            None
        }
        Some(value) => match Occupation::from_label(value) {
            Some(occupation) => Some(occupation),
            None => {
                failures.push(ValidationFailure::UnknownOccupation);
                None
            }
        },
    };

    let notes = submission
        .notes
        .map(|value| value.trim().to_string())
        .unwrap_or_default();

    if !failures.is_empty() {
        return Err(failures);
    }

    // Every accumulator is Some by construction once the failure list is empty.
    match (
        surname,
        name,
        gender,
        age,
        mobile_number,
        email_address,
        national_id_number,
        village,
        occupation,
    ) {
        (
            Some(surname),
            Some(name),
            Some(gender),
            Some(age),
            Some(mobile_number),
            Some(email_address),
            Some(national_id_number),
            Some(village),
            Some(occupation),
        ) => Ok(MemberDraft {
            surname,
            name,
            gender,
            age,
            mobile_number,
            email_address,
            national_id_number,
            village,
            occupation,
            notes,
        }),
        _ => Err(vec![ValidationFailure::Missing("submission")]),
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    failures: &mut Vec<ValidationFailure>,
) -> Option<String> {
    let trimmed = value.map(|value| value.trim().to_string());
    match trimmed {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            failures.push(ValidationFailure::Missing(field));
            None
        }
    }
}

fn digit_field(
    value: Option<String>,
    field: &'static str,
    expected_digits: usize,
    failure: ValidationFailure,
    failures: &mut Vec<ValidationFailure>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => {
            failures.push(ValidationFailure::Missing(field));
            None
        }
        Some(raw) => {
            let digits = strip_non_digits(raw);
            if digits.len() == expected_digits {
                Some(digits)
            } else {
                failures.push(failure);
                None
            }
        }
    }
}

/// Keep only ASCII digits, dropping separators like spaces and dashes.
pub(crate) fn strip_non_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Shape check only: a single `@`, non-empty whitespace-free local and domain
/// parts, and a `.` splitting the domain into non-empty halves.
pub(crate) fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if local.chars().any(char::is_whitespace) || domain.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}
