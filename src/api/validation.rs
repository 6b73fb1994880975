use super::ApiError;
use crate::domain::{EntityId, RelationKind, ShowId};

fn parse_positive_id(raw: &str, label: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!(
            "Invalid {label} ID: {raw}. ID must be a positive integer"
        ))),
    }
}

pub fn parse_show_id(raw: &str) -> Result<ShowId, ApiError> {
    parse_positive_id(raw, "show").map(ShowId::new)
}

pub fn parse_entity_id(raw: &str) -> Result<EntityId, ApiError> {
    parse_positive_id(raw, "entity").map(EntityId::new)
}

/// Unknown collections are reported as missing resources.
pub fn parse_kind(raw: &str) -> Result<RelationKind, ApiError> {
    raw.parse::<RelationKind>()
        .map_err(|_| ApiError::NotFound(format!("Unknown collection '{raw}'")))
}

pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !email.chars().any(char::is_whitespace)
    });

    if !valid {
        return Err(ApiError::validation("Invalid email format"));
    }
    Ok(email.to_lowercase())
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }
    Ok(password)
}

/// Digits with optional leading `+` and common separators, 7 to 15 digits.
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.'));
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if !allowed || !(7..=15).contains(&digits) {
        return Err(ApiError::validation("Invalid phone number format"));
    }
    Ok(Some(phone.to_string()))
}
