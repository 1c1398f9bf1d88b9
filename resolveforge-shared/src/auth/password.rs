/// Password hashing using Argon2id
///
/// Hashes are stored as PHC strings in `users.password_hash`. Legacy accounts
/// created before passwords existed have no hash and claim one on their next
/// login.
///
/// # Parameters
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// Hashing is CPU- and memory-heavy; async callers should run it on
/// `tokio::task::spawn_blocking`.
///
/// # Example
///
/// ```
/// use resolveforge_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Refund-Me-2025!")?;
/// assert!(verify_password("Refund-Me-2025!", &hash)?);
/// assert!(!verify_password("refund-me-2025!", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with a fresh random salt
///
/// Returns the PHC string, e.g.
/// `$argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash cannot be
/// parsed or verification itself fails.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters come from the PHC string
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Checks a new password against the account password rules
///
/// At least 8 characters, with an uppercase letter, a lowercase letter, a
/// digit and a non-alphanumeric character. The error string is shown to the
/// user as-is.
///
/// ```
/// use resolveforge_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Faulty-Kettle1").is_ok());
/// assert!(validate_password_strength("kettle").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("Faulty-Kettle1").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("Faulty-Kettle1").unwrap();
        let second = hash_password("Faulty-Kettle1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Faulty-Kettle1").unwrap();

        assert!(verify_password("Faulty-Kettle1", &hash).unwrap());
        assert!(!verify_password("faulty-kettle1", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_unparseable_hash() {
        assert!(matches!(
            verify_password("Faulty-Kettle1", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
        // Parses as a PHC string without an output, so it can never match
        assert!(!matches!(
            verify_password("Faulty-Kettle1", "$argon2id$invalid"),
            Ok(true)
        ));
    }

    #[test]
    fn test_verify_password_non_ascii() {
        let password = "Pâté-sur-Loire£9";
        let hash = hash_password(password).expect("Hash should succeed");
        assert!(verify_password(password, &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_validate_password_strength_counts_characters_not_bytes() {
        // 7 characters, 9 bytes
        let result = validate_password_strength("Ab1!££x");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least 8 characters"));
    }

    #[test]
    fn test_validate_password_strength_valid() {
        let valid_passwords = vec!["Faulty-Kettle1", "Refund#Owed25", "Section 9 CRA!"];

        for password in valid_passwords {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_validate_password_strength_too_short() {
        let result = validate_password_strength("Fr1dge!");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least 8 characters"));
    }

    #[test]
    fn test_validate_password_strength_no_uppercase() {
        let result = validate_password_strength("washing-machine1");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("uppercase letter"));
    }

    #[test]
    fn test_validate_password_strength_no_lowercase() {
        let result = validate_password_strength("WASHING-MACHINE1");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("lowercase letter"));
    }

    #[test]
    fn test_validate_password_strength_no_digit() {
        let result = validate_password_strength("Washing-Machine");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("digit"));
    }

    #[test]
    fn test_validate_password_strength_no_special() {
        let result = validate_password_strength("WashingMachine1");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("special character"));
    }
}
