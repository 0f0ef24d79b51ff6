//! Israeli phone number normalization.
//!
//! The normalized form (`0XXXXXXXXX`, ten digits) is the identity key used
//! for duplicate detection, ban checks, and cancellation lookup. Every
//! inbound phone number must pass through here before touching the
//! database.

use crate::error::CoreError;

/// Normalize an Israeli phone number to `0XXXXXXXXX`.
///
/// Accepts common formattings: `050-123-4567`, `(050) 123 4567`,
/// `+972501234567`. Separators (spaces, dashes, parentheses) are stripped,
/// a `+972` country prefix becomes a leading `0`.
///
/// # Errors
///
/// [`CoreError::Validation`] for anything that does not reduce to ten
/// digits starting with `0`.
pub fn normalize_phone(raw: &str) -> Result<String, CoreError> {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let candidate = match stripped.strip_prefix("+972") {
        Some(rest) => format!("0{rest}"),
        None => stripped,
    };

    let valid = candidate.len() == 10
        && candidate.starts_with('0')
        && candidate.bytes().all(|b| b.is_ascii_digit());

    if !valid {
        return Err(CoreError::Validation(
            "invalid Israeli phone number format".into(),
        ));
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn normalizes_dashed() {
        assert_eq!(normalize_phone("050-123-4567").unwrap(), "0501234567");
    }

    #[test]
    fn normalizes_international() {
        assert_eq!(normalize_phone("+972501234567").unwrap(), "0501234567");
    }

    #[test]
    fn normalizes_spaces_and_parens() {
        assert_eq!(normalize_phone("(050) 123 4567").unwrap(), "0501234567");
    }

    #[test]
    fn identical_key_across_formats() {
        assert_eq!(
            normalize_phone("050-123-4567").unwrap(),
            normalize_phone("+972501234567").unwrap()
        );
    }

    #[test]
    fn rejects_nine_digits() {
        assert_matches!(normalize_phone("050123456"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_eleven_digits() {
        assert_matches!(
            normalize_phone("05012345678"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_foreign_prefix() {
        assert_matches!(
            normalize_phone("+15551234567"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_missing_leading_zero() {
        assert_matches!(normalize_phone("5012345678"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rejects_letters() {
        assert_matches!(normalize_phone("050-ABC-4567"), Err(CoreError::Validation(_)));
    }
}
