// ============================
// parley-backend-lib/src/auth/service.rs
// ============================
//! Signup and login against the credential store. Stateless between
//! requests: identity confirmation only, no tokens or server-side sessions.
use crate::auth::password::{hash_password_secure, verify_password};
use crate::error::AppError;
use crate::storage::{AccountRecord, CredentialStore};
use parley_common::{LoginRequest, SignupRequest};
use tracing::info;

/// Create a new account. Username and phone number must each be unique
/// across all accounts.
pub async fn signup(store: &dyn CredentialStore, req: SignupRequest) -> Result<(), AppError> {
    if req.fullname.is_empty()
        || req.username.is_empty()
        || req.phone_number.is_empty()
        || req.password.is_empty()
    {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    if store.get(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let phone_taken = store
        .list()
        .await?
        .iter()
        .any(|(_, record)| record.phone_number == req.phone_number);
    if phone_taken {
        return Err(AppError::Conflict(
            "Account already exists with this phone number".to_string(),
        ));
    }

    let mut password = req.password;
    let hash = hash_password_secure(&mut password).map_err(|e| AppError::Hash(e.to_string()))?;

    store
        .insert(
            &req.username,
            AccountRecord {
                fullname: req.fullname,
                phone_number: req.phone_number,
                name_in_use: req.username.clone(),
                hash_password: hash,
            },
        )
        .await?;

    info!(username = %req.username, "new account created");
    Ok(())
}

/// Verify credentials and return the stored fullname.
pub async fn login(store: &dyn CredentialStore, req: LoginRequest) -> Result<String, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("Enter the data".to_string()));
    }

    let record = store
        .get(&req.username)
        .await?
        .ok_or(AppError::UnknownAccount)?;

    if !verify_password(&record.hash_password, &req.password) {
        return Err(AppError::InvalidPassword);
    }

    info!(username = %req.username, "user logged in");
    Ok(record.fullname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStore;
    use tempfile::TempDir;

    fn signup_req(fullname: &str, username: &str, phone: &str, password: &str) -> SignupRequest {
        SignupRequest {
            fullname: fullname.to_string(),
            username: username.to_string(),
            phone_number: phone.to_string(),
            password: password.to_string(),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("USERS.json")).unwrap()
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        signup(&store, signup_req("Alice A", "alice", "555-1", "pw1"))
            .await
            .unwrap();

        let fullname = login(&store, login_req("alice", "pw1")).await.unwrap();
        assert_eq!(fullname, "Alice A");
    }

    #[tokio::test]
    async fn test_signup_missing_field_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = signup(&store, signup_req("Alice A", "alice", "", "pw1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signup_duplicate_username_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        signup(&store, signup_req("Bob B", "bob", "555-2", "pw1"))
            .await
            .unwrap();
        let err = signup(&store, signup_req("Other Bob", "bob", "555-3", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // store unchanged: the original record survives
        let record = store.get("bob").await.unwrap().unwrap();
        assert_eq!(record.fullname, "Bob B");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_duplicate_phone_number_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        signup(&store, signup_req("Alice A", "alice", "555-1", "pw1"))
            .await
            .unwrap();
        let err = signup(&store, signup_req("Bob B", "bob", "555-1", "pw2"))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Account already exists with this phone number");
            },
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_unknown_account() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = login(&store, login_req("ghost", "pw1")).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownAccount));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        signup(&store, signup_req("Alice A", "alice", "555-1", "pw1"))
            .await
            .unwrap();
        let err = login(&store, login_req("alice", "wrong")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPassword));
    }

    #[tokio::test]
    async fn test_login_missing_field_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = login(&store, login_req("alice", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_password_stored_hashed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        signup(&store, signup_req("Alice A", "alice", "555-1", "pw1"))
            .await
            .unwrap();
        let record = store.get("alice").await.unwrap().unwrap();
        assert_ne!(record.hash_password, "pw1");
        assert!(record.hash_password.starts_with("$scrypt$"));
    }
}
