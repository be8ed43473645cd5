//! Local checks run before any request leaves the client.

use chrono::NaiveDate;
use thiserror::Error;

use super::DraftField;
use crate::api::types::date_format;

/// Longest accepted description or notes text, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 4;

/// Inclusive score bounds.
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// A draft or form failed a local check. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Preencha todos os campos")]
    MissingCredentials,

    #[error("O campo {} é obrigatório", .0.label())]
    MissingField(DraftField),

    #[error("O campo {} deve ter no máximo {max} caracteres", .field.label())]
    TooLong { field: DraftField, max: usize },

    #[error("A senha deve ter pelo menos {min} caracteres")]
    PasswordTooShort { min: usize },

    #[error("As senhas não coincidem")]
    PasswordMismatch,

    #[error("O campo {} deve ser um número", .0.label())]
    NotANumber(DraftField),

    #[error("A nota deve estar entre 0 e 10")]
    ScoreOutOfRange,

    #[error("Data inválida, use o formato AAAA-MM-DD")]
    InvalidDate,

    #[error("Um curso não pode ser o seu próprio curso de reforço")]
    SelfReference,
}

/// Trimmed value of a required field.
pub fn required(field: DraftField, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Reject text longer than [`MAX_TEXT_CHARS`].
pub fn bounded_text(field: DraftField, value: &str) -> Result<String, ValidationError> {
    if value.chars().count() > MAX_TEXT_CHARS {
        Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_CHARS,
        })
    } else {
        Ok(value.to_string())
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_CHARS`].
pub fn password(value: &str) -> Result<String, ValidationError> {
    if value.chars().count() < MIN_PASSWORD_CHARS {
        Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_CHARS,
        })
    } else {
        Ok(value.to_string())
    }
}

/// Parse a score typed as `7.5` or `7,5`, check its range and keep one decimal.
pub fn score(value: &str) -> Result<f64, ValidationError> {
    let raw = required(DraftField::Score, value)?.replace(',', ".");
    let parsed: f64 = raw
        .parse()
        .map_err(|_| ValidationError::NotANumber(DraftField::Score))?;

    if !parsed.is_finite() {
        return Err(ValidationError::NotANumber(DraftField::Score));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&parsed) {
        return Err(ValidationError::ScoreOutOfRange);
    }
    Ok((parsed * 10.0).round() / 10.0)
}

/// Parse a `YYYY-MM-DD` date.
pub fn date(value: &str) -> Result<NaiveDate, ValidationError> {
    let raw = required(DraftField::Date, value)?;
    if raw.len() != 10 {
        return Err(ValidationError::InvalidDate);
    }
    date_format::parse(&raw).ok_or(ValidationError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required(DraftField::Name, "  Física ").unwrap(), "Física");
        assert_eq!(
            required(DraftField::Name, "   "),
            Err(ValidationError::MissingField(DraftField::Name))
        );
    }

    #[test]
    fn test_bounded_text_counts_characters() {
        let accents = "é".repeat(MAX_TEXT_CHARS);
        assert!(bounded_text(DraftField::Description, &accents).is_ok());

        let too_long = "a".repeat(MAX_TEXT_CHARS + 1);
        assert!(matches!(
            bounded_text(DraftField::Description, &too_long),
            Err(ValidationError::TooLong { max: 500, .. })
        ));
    }

    #[test]
    fn test_password_length() {
        assert_eq!(
            password("abc"),
            Err(ValidationError::PasswordTooShort { min: 4 })
        );
        assert!(password("abcd").is_ok());
    }

    #[test]
    fn test_score_bounds() {
        assert_eq!(score("10.0"), Ok(10.0));
        assert_eq!(score("0.0"), Ok(0.0));
        assert_eq!(score("10.1"), Err(ValidationError::ScoreOutOfRange));
        assert_eq!(score("-0.1"), Err(ValidationError::ScoreOutOfRange));
    }

    #[test]
    fn test_score_accepts_comma_and_rounds() {
        assert_eq!(score("7,5"), Ok(7.5));
        assert_eq!(score("6.66"), Ok(6.7));
        assert_eq!(
            score("sete"),
            Err(ValidationError::NotANumber(DraftField::Score))
        );
        assert_eq!(
            score(""),
            Err(ValidationError::MissingField(DraftField::Score))
        );
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(date("2024-03-01"), Ok(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(date("01/03/2024"), Err(ValidationError::InvalidDate));
        assert_eq!(date("2024-02-30"), Err(ValidationError::InvalidDate));
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = ValidationError::MissingField(DraftField::Course);
        assert_eq!(err.to_string(), "O campo Curso é obrigatório");
    }
}
