// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request field validation.
//!
//! Each request body is checked field by field in declaration order and the
//! first violation is reported. Lengths are counted in characters, not bytes.

use unicode_normalization::UnicodeNormalization;

use crate::models::{
    Address, CardRequest, Image, LoginRequest, PersonName, RegisterRequest, UpdateAccountRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{field}\" {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

/// Canonical form used for email storage and lookup: trimmed, NFKC
/// normalized, lower-cased.
pub fn canonical_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

// =============================================================================
// Field Rules
// =============================================================================

fn length(field: &'static str, value: &str, min: usize, max: Option<usize>) -> ValidationResult {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, "is not allowed to be empty"));
    }
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("length must be at least {min} characters long"),
        ));
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::new(
                field,
                format!("length must be less than or equal to {max} characters long"),
            ));
        }
    }
    Ok(())
}

/// Empty is allowed; anything else must satisfy the length rule.
fn optional_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> ValidationResult {
    if value.is_empty() {
        return Ok(());
    }
    length(field, value, min, max)
}

fn number_range(field: &'static str, value: u32, min: u32, max: Option<u32>) -> ValidationResult {
    if value < min {
        return Err(ValidationError::new(
            field,
            format!("must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::new(
                field,
                format!("must be less than or equal to {max}"),
            ));
        }
    }
    Ok(())
}

/// Runs on the canonical form, which is what gets stored and looked up.
/// Any TLD of two or more characters is accepted; there is no registry list.
fn email(field: &'static str, value: &str) -> ValidationResult {
    length(field, value, 5, None)?;

    let invalid = || ValidationError::new(field, "must be a valid email");
    let value = canonical_email(value);
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    if labels.last().map_or(true, |tld| tld.chars().count() < 2) {
        return Err(invalid());
    }
    Ok(())
}

fn name(value: &PersonName) -> ValidationResult {
    length("name.first", &value.first, 2, Some(256))?;
    optional_length("name.middle", &value.middle, 2, Some(256))?;
    length("name.last", &value.last, 2, Some(256))
}

fn phone(field: &'static str, value: &str) -> ValidationResult {
    length(field, value, 9, Some(11))
}

fn account_image(value: &Image) -> ValidationResult {
    length("image.url", &value.url, 14, None)?;
    length("image.alt", &value.alt, 2, Some(256))
}

fn card_image(value: &Image) -> ValidationResult {
    optional_length("image.url", &value.url, 14, None)?;
    optional_length("image.alt", &value.alt, 2, Some(256))
}

fn account_address(value: &Address) -> ValidationResult {
    optional_length("address.state", &value.state, 2, Some(256))?;
    length("address.country", &value.country, 2, Some(256))?;
    length("address.city", &value.city, 2, Some(256))?;
    length("address.street", &value.street, 2, Some(256))?;
    number_range("address.houseNumber", value.house_number, 2, Some(256))?;
    match value.zip {
        Some(zip) => number_range("address.zip", zip, 2, None),
        None => Err(ValidationError::new("address.zip", "is required")),
    }
}

fn card_address(value: &Address) -> ValidationResult {
    length("address.country", &value.country, 1, None)?;
    length("address.city", &value.city, 1, None)?;
    length("address.street", &value.street, 1, None)?;
    number_range("address.houseNumber", value.house_number, 1, None)
}

// =============================================================================
// Request Bodies
// =============================================================================

impl Validate for RegisterRequest {
    fn validate(&self) -> ValidationResult {
        name(&self.name)?;
        phone("phone", &self.phone)?;
        email("email", &self.email)?;
        length("password", &self.password, 7, Some(20))?;
        account_image(&self.image)?;
        account_address(&self.address)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> ValidationResult {
        email("email", &self.email)?;
        length("password", &self.password, 7, Some(20))
    }
}

impl Validate for UpdateAccountRequest {
    fn validate(&self) -> ValidationResult {
        name(&self.name)?;
        phone("phone", &self.phone)?;
        account_image(&self.image)?;
        account_address(&self.address)
    }
}

impl Validate for CardRequest {
    fn validate(&self) -> ValidationResult {
        length("title", &self.title, 2, Some(256))?;
        length("subtitle", &self.subtitle, 2, Some(256))?;
        length("description", &self.description, 2, Some(1024))?;
        phone("phone", &self.phone)?;
        email("email", &self.email)?;
        optional_length("web", &self.web, 14, None)?;
        card_image(&self.image)?;
        card_address(&self.address)
    }
}
