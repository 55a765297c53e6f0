/// Validate a display name: 2-100 chars after trimming.
pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Name is required".to_string());
    }
    if trimmed.chars().count() < 2 {
        return Some("Name must be at least 2 characters".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Some("Name must be at most 100 characters".to_string());
    }
    None
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Email must be a valid address".to_string()),
    }
}

/// Validate a password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a postal pincode: exactly six digits.
pub fn validate_pincode(pincode: &str) -> Option<String> {
    let trimmed = pincode.trim();
    if trimmed.len() != 6 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some("Pincode must be exactly 6 digits".to_string());
    }
    None
}

/// Validate a phone number: optional, otherwise 10-15 digits with an optional leading '+'.
pub fn validate_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return None;
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Some("Phone must be 10-15 digits".to_string());
    }
    None
}

/// Validate a human-chosen supervisor id: 3-32 chars, letters, digits, '-' and '_'.
pub fn validate_supervisor_id(id: &str) -> Option<String> {
    let trimmed = id.trim();
    if trimmed.len() < 3 || trimmed.len() > 32 {
        return Some("Supervisor id must be 3-32 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Some("Supervisor id may only contain letters, digits, '-' and '_'".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

pub fn validate_rating(rating: i16) -> Option<String> {
    if !(1..=5).contains(&rating) {
        return Some("Rating must be between 1 and 5".to_string());
    }
    None
}

/// Costs and counts must be finite and not negative.
pub fn validate_non_negative(value: f64, field_name: &str) -> Option<String> {
    if !value.is_finite() || value < 0.0 {
        return Some(format!("{field_name} must be a non-negative number"));
    }
    None
}
