use super::{
    AddCartItemRequest, AddressForm, PostalCode, UpdateAddressRequest, ValidationError,
    ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_ADDRESS_FIELD_LENGTH: usize = 200;
pub const MAX_NUMBER_LENGTH: usize = 20;
pub const MAX_POSTAL_CODE_INPUT_LENGTH: usize = 20;
pub const MAX_PRODUCT_ID_LENGTH: usize = 64;
pub const MAX_SESSION_ID_LENGTH: usize = 64;

impl Validate for AddCartItemRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)
    }
}

impl Validate for UpdateAddressRequest {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(postal_code) = &self.postal_code {
            validate_text("postal_code", postal_code, MAX_POSTAL_CODE_INPUT_LENGTH)?;
        }
        if let Some(street) = &self.street {
            validate_text("street", street, MAX_ADDRESS_FIELD_LENGTH)?;
        }
        if let Some(neighborhood) = &self.neighborhood {
            validate_text("neighborhood", neighborhood, MAX_ADDRESS_FIELD_LENGTH)?;
        }
        if let Some(number) = &self.number {
            validate_text("number", number, MAX_NUMBER_LENGTH)?;
        }
        if let Some(complement) = &self.complement {
            validate_text("complement", complement, MAX_ADDRESS_FIELD_LENGTH)?;
        }
        Ok(())
    }
}

/// A confirmed address needs every field except the complement
impl Validate for AddressForm {
    fn validate(&self) -> ValidationResult<()> {
        PostalCode::parse(&self.postal_code)?;
        validate_required("street", &self.street)?;
        validate_required("neighborhood", &self.neighborhood)?;
        validate_required("number", &self.number)?;
        validate_text("street", &self.street, MAX_ADDRESS_FIELD_LENGTH)?;
        validate_text("neighborhood", &self.neighborhood, MAX_ADDRESS_FIELD_LENGTH)?;
        validate_text("number", &self.number, MAX_NUMBER_LENGTH)?;
        validate_text("complement", &self.complement, MAX_ADDRESS_FIELD_LENGTH)?;
        Ok(())
    }
}

/// Validate product ID
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    validate_identifier("product_id", product_id, MAX_PRODUCT_ID_LENGTH)
}

/// Validate session ID
pub fn validate_session_id(session_id: &str) -> ValidationResult<()> {
    validate_identifier("session_id", session_id, MAX_SESSION_ID_LENGTH)
}

fn validate_identifier(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    if trimmed.len() > max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length,
            actual_length: trimmed.len(),
        });
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "alphanumeric characters, hyphens, and underscores only".to_string(),
        });
    }

    Ok(())
}

fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Free-text field: bounded length, no control characters
pub fn validate_text(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let length = value.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length,
            actual_length: length,
        });
    }

    if value.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}
