use chrono::{Datelike, NaiveDate};

use super::FieldErrors;

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Whole years elapsed between `date_of_birth` and `today`, calendar-aware.
/// Negative when the birth date lies in the future.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Returns true when the field passed.
pub(super) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    max_len: Option<usize>,
) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, format!("{label} is required"));
        return false;
    }

    if let Some(max) = max_len {
        if value.chars().count() > max {
            errors.insert(field, format!("{label} must be {max} characters or less"));
            return false;
        }
    }

    true
}

pub(super) fn required<T>(errors: &mut FieldErrors, field: &str, label: &str, value: &Option<T>) {
    if value.is_none() {
        errors.insert(field, format!("{label} is required"));
    }
}

pub(super) fn ssn(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if !required_text(errors, field, label, value, None) {
        return;
    }
    if digits_only(value).len() != 9 {
        errors.insert(field, "SSN must be 9 digits (XXX-XX-XXXX)");
    }
}

pub(super) fn phone(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    invalid: &str,
) {
    if !required_text(errors, field, label, value, None) {
        return;
    }
    if digits_only(value).len() != 10 {
        errors.insert(field, invalid);
    }
}

pub(super) fn zip_code(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: &str,
    invalid: &str,
) {
    if !required_text(errors, field, label, value, None) {
        return;
    }
    let trimmed = value.trim();
    if trimmed.len() != 5 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        errors.insert(field, invalid);
    }
}

pub(super) fn email(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if !required_text(errors, field, label, value, None) {
        return;
    }
    if !looks_like_email(value) {
        errors.insert(field, "Please enter a valid email address");
    }
}

/// `local@domain.tld`: no whitespace, a single `@`, and a dot inside the domain.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.chars().any(|c| c.is_whitespace() || c == '@');
    if !clean(local) || !clean(domain) {
        return false;
    }

    domain
        .char_indices()
        .any(|(index, c)| c == '.' && index > 0 && index + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_turns_over_on_the_birthday() {
        let dob = date(2008, 3, 15);
        assert_eq!(age_on(dob, date(2026, 3, 14)), 17);
        assert_eq!(age_on(dob, date(2026, 3, 15)), 18);
        assert_eq!(age_on(date(2027, 1, 1), date(2026, 3, 15)), -1);
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("jane.doe@example.org"));
        assert!(!looks_like_email("jane doe@example.org"));
        assert!(!looks_like_email("jane@example"));
        assert!(!looks_like_email("jane@.org"));
        assert!(!looks_like_email("jane@example."));
        assert!(!looks_like_email("@example.org"));
        assert!(!looks_like_email("jane@@example.org"));
    }

    #[test]
    fn required_text_checks_length_in_characters() {
        let mut errors = FieldErrors::new();
        assert!(required_text(&mut errors, "name", "Name", &"é".repeat(50), Some(50)));
        assert!(!required_text(&mut errors, "name", "Name", &"é".repeat(51), Some(50)));
        assert_eq!(
            errors.get("name"),
            Some("Name must be 50 characters or less")
        );
    }

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("(614) 555-0100"), "6145550100");
        assert_eq!(digits_only("123-45-6789"), "123456789");
    }
}
