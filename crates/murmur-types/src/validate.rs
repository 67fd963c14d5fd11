//! Boundary validation for client-supplied fields. Handlers run these before
//! touching the store, so the persisted row types stay free of validation
//! logic.

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters long");
    }
    if username.len() > 30 {
        return Err("Username must be at most 30 characters long");
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Username can only contain letters, numbers, and underscores");
    }
    Ok(())
}

/// Same shape the signup form enforces: `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Please enter a valid email address");
    };

    let domain_ok = domain
        .split_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());

    if local.is_empty() || !domain_ok {
        return Err("Please enter a valid email address");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 6 {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

pub fn validate_message_content(content: &str) -> Result<(), &'static str> {
    if content.trim().is_empty() {
        return Err("Message content is required");
    }
    Ok(())
}
