//! Checks applied to owner addresses, region names and risk observations
//! before they are written.

use thiserror::Error;

/// Input rejected before it reaches the database.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("owner address '{address}' is malformed: {problem}")]
    Address { address: String, problem: &'static str },

    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} has {actual} characters, limit is {limit}")]
    Length {
        field: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("{field} = {value} lies outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// RFC 5321 path limit.
pub const MAX_ADDRESS_LENGTH: usize = 254;

pub const MAX_REGION_NAME_LENGTH: usize = 128;

/// Shape check for an owner's email address (`local@domain.tld`).
///
/// Deliverability is left to the mail relay.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let address = email.trim();
    let malformed = |problem| ValidationError::Address {
        address: address.to_string(),
        problem,
    };

    if address.is_empty() {
        return Err(ValidationError::Blank { field: "email" });
    }
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(ValidationError::Length {
            field: "email",
            limit: MAX_ADDRESS_LENGTH,
            actual: address.len(),
        });
    }
    if address.chars().any(char::is_whitespace) {
        return Err(malformed("contains whitespace"));
    }

    let Some((local, domain)) = address.split_once('@') else {
        return Err(malformed("missing '@'"));
    };
    if domain.contains('@') {
        return Err(malformed("more than one '@'"));
    }
    if local.is_empty() {
        return Err(malformed("empty local part"));
    }
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(malformed("domain needs dot-separated, non-empty labels"));
    }

    Ok(())
}

pub fn validate_region_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Blank {
            field: "region name",
        });
    }

    let actual = name.chars().count();
    if actual > MAX_REGION_NAME_LENGTH {
        return Err(ValidationError::Length {
            field: "region name",
            limit: MAX_REGION_NAME_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Coordinates must be WGS84 degrees and probability a fraction.
pub fn validate_observation(
    latitude: f64,
    longitude: f64,
    probability: f64,
) -> Result<(), ValidationError> {
    let bounds = [
        ("latitude", latitude, -90.0, 90.0),
        ("longitude", longitude, -180.0, 180.0),
        ("probability", probability, 0.0, 1.0),
    ];

    match bounds
        .into_iter()
        .find(|&(_, value, min, max)| !(min..=max).contains(&value))
    {
        Some((field, value, min, max)) => Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        }),
        None => Ok(()),
    }
}
