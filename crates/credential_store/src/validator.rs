//! Credential validation
//!
//! Field rules live on `DeliveryCredential` (validator derive); this module
//! attaches the list position so operators can find the bad record.

use contracts::{ContractError, DeliveryCredential};
use ::validator::Validate;

/// Validate one credential at list position `index`
pub fn validate_one(index: usize, credential: &DeliveryCredential) -> Result<(), ContractError> {
    credential.validate().map_err(|errors| {
        let fields = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(",");
        ContractError::config_validation(
            format!("credentials[{index}].{fields}"),
            errors.to_string(),
        )
    })
}

/// Validate every credential, returning the first error
pub fn validate(credentials: &[DeliveryCredential]) -> Result<(), ContractError> {
    for (index, credential) in credentials.iter().enumerate() {
        validate_one(index, credential)?;
    }
    Ok(())
}
