/// Account authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength rules
/// - [`session`]: signed session tokens (HS256 JWT)
/// - [`middleware`]: session cookie handling and the request auth layer
///
/// # Example
///
/// ```no_run
/// use resolveforge_shared::auth::password::{hash_password, verify_password};
/// use resolveforge_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Corr3ct!Horse")?;
/// assert!(verify_password("Corr3ct!Horse", &hash)?);
///
/// let secret = "a-session-secret-of-at-least-32-bytes!!";
/// let claims = SessionClaims::new(Uuid::new_v4(), "jo@example.co.uk", 365);
/// let token = create_session_token(&claims, secret)?;
/// let validated = validate_session_token(&token, secret)?;
/// assert_eq!(validated.email, "jo@example.co.uk");
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod session;
