use email_address::EmailAddress;
use sha2::{Digest, Sha512};
use tracing::warn;

use super::app_error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn check_email_address(email: &str) -> Result<(), AppError> {
    if !EmailAddress::is_valid(email) {
        warn!("Invalid email `{email}`");
        return Err(AppError::bad_request("The email address is not valid."));
    }
    Ok(())
}

pub fn check_signup_infos(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        warn!("Signup attempt with an empty name");
        return Err(AppError::bad_request("The name cannot be empty."));
    }

    check_email_address(email)?;

    if password.len() < MIN_PASSWORD_LEN {
        warn!("Signup attempt with a too short password");
        return Err(AppError::bad_request(
            "The password must contain at least 6 characters.",
        ));
    }

    Ok(())
}

pub fn check_new_post_data(auth_user_id: i64, title: &str, content: &str) -> Result<(), AppError> {
    if title.is_empty() || title.len() > 200 {
        warn!(
            "User {auth_user_id} tried to create a post with a title with a wrong length : {}/200",
            title.len()
        );
        return Err(AppError::bad_request(
            "The title of a post must contain between 1 and 200 characters.",
        ));
    }

    if content.is_empty() {
        warn!("User {auth_user_id} tried to create a post with an empty content");
        return Err(AppError::bad_request(
            "The content of a post cannot be empty.",
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(password);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_rejects_blank_name_bad_email_and_short_password() {
        assert!(check_signup_infos("  ", "a@b.com", "longenough").is_err());
        assert!(check_signup_infos("Alice", "not-an-email", "longenough").is_err());
        assert!(check_signup_infos("Alice", "a@b.com", "pw123").is_err());
        assert!(check_signup_infos("Alice", "a@b.com", "pw1234").is_ok());
    }

    #[test]
    fn post_data_rejects_empty_fields() {
        assert!(check_new_post_data(1, "", "content").is_err());
        assert!(check_new_post_data(1, "Hello", "").is_err());
        assert!(check_new_post_data(1, &"t".repeat(201), "content").is_err());
        assert!(check_new_post_data(1, "Hello", "content").is_ok());
    }

    #[test]
    fn password_hash_is_stable_sha512_hex() {
        let hash = hash_password("pw123456");
        assert_eq!(hash.len(), 128);
        assert_eq!(hash, hash_password("pw123456"));
        assert_ne!(hash, hash_password("pw1234567"));
    }
}
