//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is positive
pub fn validate_positive_amount(field: &str, amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::validation(
            field,
            format!("must be positive, got {amount}"),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a reference id is present
pub fn validate_reference(field: &str, id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::validation(field, "cannot be empty"));
    }

    if id.len() > 50 {
        return Err(LedgerError::validation(
            field,
            "cannot exceed 50 characters",
        ));
    }

    Ok(())
}

/// Validate a free-text description
pub fn validate_description(description: &str) -> LedgerResult<()> {
    if description.len() > 500 {
        return Err(LedgerError::validation(
            "description",
            "cannot exceed 500 characters",
        ));
    }

    Ok(())
}

/// Validate that a list of line items is not empty
pub fn validate_lines_present<T>(lines: &[T]) -> LedgerResult<()> {
    if lines.is_empty() {
        return Err(LedgerError::validation(
            "lines",
            "at least one line item is required",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount("qty", &BigDecimal::from(1)).is_ok());
        let err = validate_positive_amount("qty", &BigDecimal::from(0)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation {
                field: "qty".to_string(),
                message: "must be positive, got 0".to_string(),
            }
        );
    }

    #[test]
    fn test_reference_and_lines() {
        assert!(validate_reference("customer_id", "  ").is_err());
        assert!(validate_reference("customer_id", "c1").is_ok());
        assert!(validate_lines_present::<u8>(&[]).is_err());
        assert!(validate_description(&"x".repeat(501)).is_err());
    }
}
