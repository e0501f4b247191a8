//! Access decision over a file record and a caller identity.

use dochub_core::error::AppError;
use dochub_core::result::AppResult;
use dochub_core::types::UserId;
use dochub_entity::file::FileMeta;

/// Decides whether a user may read or manage a file.
///
/// Pure and synchronous: the decision uses only the record, so it is run
/// on every read whether the record came from cache or from the source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Creates a new gate.
    pub fn new() -> Self {
        Self
    }

    /// Whether `user` may read the file: public, owner, or grantee.
    pub fn can_read(&self, meta: &FileMeta, user: UserId) -> bool {
        meta.is_public || meta.is_owned_by(user) || meta.is_granted_to(user)
    }

    /// Whether `user` may delete the file: owner or grantee.
    pub fn can_manage(&self, meta: &FileMeta, user: UserId) -> bool {
        meta.is_owned_by(user) || meta.is_granted_to(user)
    }

    /// Read check; denial is `AccessDenied`.
    pub fn check(&self, meta: &FileMeta, user: UserId) -> AppResult<()> {
        if self.can_read(meta, user) {
            Ok(())
        } else {
            Err(AppError::access_denied(format!(
                "User {user} may not access file {}",
                meta.id
            )))
        }
    }

    /// Delete check; denial is `AccessDenied`.
    pub fn check_manage(&self, meta: &FileMeta, user: UserId) -> AppResult<()> {
        if self.can_manage(meta, user) {
            Ok(())
        } else {
            Err(AppError::access_denied(format!(
                "User {user} may not delete file {}",
                meta.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dochub_core::error::ErrorKind;
    use dochub_core::types::FileId;

    fn meta(is_public: bool) -> FileMeta {
        FileMeta {
            id: FileId(1),
            name: "plan.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 1,
            owner_id: UserId(1),
            owner_login: "alice_owner".to_string(),
            is_public,
            grants: vec![UserId(2)],
            created_at: Utc::now(),
            storage_path: "1/0_plan.txt".to_string(),
        }
    }

    #[test]
    fn test_private_file_read_rules() {
        let gate = AccessGate::new();
        let m = meta(false);
        assert!(gate.check(&m, UserId(1)).is_ok());
        assert!(gate.check(&m, UserId(2)).is_ok());
        let err = gate.check(&m, UserId(3)).expect_err("stranger");
        assert_eq!(err.kind, ErrorKind::AccessDenied);
    }

    #[test]
    fn test_public_file_readable_but_not_deletable_by_strangers() {
        let gate = AccessGate::new();
        let m = meta(true);
        assert!(gate.check(&m, UserId(3)).is_ok());
        assert!(gate.check_manage(&m, UserId(3)).is_err());
        assert!(gate.check_manage(&m, UserId(2)).is_ok());
    }
}
