//! Form checks done before the client is asked to log in or sign up.

use anyhow::{bail, Result};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

pub fn login_fields(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        bail!("Please fill in every field");
    }
    Ok(())
}

pub fn signup_fields(username: &str, email: &str, password: &str) -> Result<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        bail!("Please fill in every field");
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        bail!("Username must be at least {} characters", MIN_USERNAME_LEN);
    }
    if !looks_like_email(email) {
        bail!("Please enter a valid email");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace anywhere.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_fields() {
        assert!(login_fields("a@b.com", "pw").is_ok());
        assert!(login_fields("", "pw").is_err());
        assert!(login_fields("a@b.com", "").is_err());
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("a@b.com"));
        assert!(looks_like_email("first.last@mail.tec.mx"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.com"));
        assert!(!looks_like_email("a@.com"));
        assert!(!looks_like_email("a b@c.com"));
        assert!(!looks_like_email("a@b@c.com"));
    }

    #[test]
    fn test_signup_fields() {
        assert!(signup_fields("ana", "a@b.com", "Secreto@1").is_ok());
        assert!(signup_fields("an", "a@b.com", "Secreto@1").is_err());
        assert!(signup_fields("ana", "not-an-email", "Secreto@1").is_err());
        assert!(signup_fields("ana", "a@b.com", "short").is_err());
        assert!(signup_fields("", "a@b.com", "Secreto@1").is_err());
    }
}
