//! UpdateProfileHandler - Command handler for renaming and replacing the profile photo.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::account::{public_id_from_url, Account, AccountError};
use crate::domain::foundation::AccountId;
use crate::ports::{AccountRepository, MediaStorage, MediaUpload, StorageError};

#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub account_id: AccountId,
    /// New display name; blank or absent keeps the current one.
    pub name: Option<String>,
    /// New profile photo.
    pub photo: Option<MediaUpload>,
}

#[derive(Debug)]
pub struct UpdateProfileResult {
    pub account: Account,
    /// Background removal of the replaced photo, if one was scheduled.
    ///
    /// Failures are logged by the task itself; callers may drop the handle.
    pub photo_cleanup: Option<JoinHandle<()>>,
}

pub struct UpdateProfileHandler {
    accounts: Arc<dyn AccountRepository>,
    media: Arc<dyn MediaStorage>,
}

impl UpdateProfileHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, media: Arc<dyn MediaStorage>) -> Self {
        Self { accounts, media }
    }

    pub async fn handle(&self, cmd: UpdateProfileCommand) -> Result<UpdateProfileResult, AccountError> {
        let mut account = self
            .accounts
            .find_by_id(&cmd.account_id)
            .await?
            .ok_or(AccountError::NotFound(cmd.account_id))?;

        account.rename(cmd.name.as_deref());

        let mut replaced_photo = None;
        let mut uploaded_public_id = None;
        if let Some(upload) = cmd.photo {
            let stored = self.media.upload(upload).await.map_err(|e| match e {
                StorageError::Rejected(reason) => {
                    AccountError::validation("profilePhoto", format!("Invalid profile photo: {}", reason))
                }
                other => AccountError::infrastructure(other.to_string()),
            })?;
            uploaded_public_id = Some(stored.public_id);
            replaced_photo = account.replace_photo(stored.url);
        }

        if let Err(e) = self.accounts.update(&account).await {
            // Nothing references the fresh upload when the write fails
            if let Some(public_id) = uploaded_public_id {
                self.discard_upload(account.id, &public_id).await;
            }
            return Err(e.into());
        }

        // Only drop the old asset once nothing points at it any more
        let photo_cleanup = replaced_photo
            .as_deref()
            .and_then(public_id_from_url)
            .map(|public_id| self.spawn_photo_cleanup(account.id, public_id));

        tracing::info!(
            account_id = %account.id,
            photo_replaced = photo_cleanup.is_some(),
            "Profile updated"
        );

        Ok(UpdateProfileResult {
            account,
            photo_cleanup,
        })
    }

    async fn discard_upload(&self, account_id: AccountId, public_id: &str) {
        match self.media.delete(public_id).await {
            Ok(()) => {
                tracing::debug!(account_id = %account_id, public_id = %public_id, "Removed orphaned profile photo");
            }
            Err(e) => {
                tracing::warn!(
                    account_id = %account_id,
                    public_id = %public_id,
                    error = %e,
                    "Failed to remove orphaned profile photo"
                );
            }
        }
    }

    fn spawn_photo_cleanup(&self, account_id: AccountId, public_id: String) -> JoinHandle<()> {
        let media = Arc::clone(&self.media);
        tokio::spawn(async move {
            match media.delete(&public_id).await {
                Ok(()) => {
                    tracing::debug!(account_id = %account_id, public_id = %public_id, "Removed replaced profile photo");
                }
                Err(e) => {
                    tracing::warn!(
                        account_id = %account_id,
                        public_id = %public_id,
                        error = %e,
                        "Failed to remove replaced profile photo"
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::media::InMemoryMediaStorage;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::domain::account::EmailAddress;
    use crate::domain::foundation::{CourseId, DomainError};

    struct Fixture {
        accounts: Arc<InMemoryAccountRepository>,
        media: InMemoryMediaStorage,
        handler: UpdateProfileHandler,
        alice: Account,
    }

    async fn fixture(photo_url: Option<&str>) -> Fixture {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let media = InMemoryMediaStorage::new("http://cdn.test/media");

        let mut alice = Account::register(
            "Alice",
            EmailAddress::parse("alice@example.com").unwrap(),
            "hash".to_string(),
        )
        .unwrap();
        if let Some(url) = photo_url {
            alice.replace_photo(url);
        }
        accounts.save(&alice).await.unwrap();

        let handler = UpdateProfileHandler::new(accounts.clone(), Arc::new(media.clone()));
        Fixture {
            accounts,
            media,
            handler,
            alice,
        }
    }

    fn photo() -> MediaUpload {
        MediaUpload {
            file_name: Some("me.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn renames_and_keeps_photo_when_none_given() {
        let fx = fixture(Some("http://cdn.test/media/old.png")).await;

        let result = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("Alice B".to_string()),
                photo: None,
            })
            .await
            .unwrap();

        assert_eq!(result.account.name, "Alice B");
        assert_eq!(
            result.account.photo_url.as_deref(),
            Some("http://cdn.test/media/old.png")
        );
        assert!(result.photo_cleanup.is_none());
    }

    #[tokio::test]
    async fn blank_name_keeps_existing() {
        let fx = fixture(None).await;

        let result = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("   ".to_string()),
                photo: None,
            })
            .await
            .unwrap();

        assert_eq!(result.account.name, "Alice");
    }

    #[tokio::test]
    async fn new_photo_replaces_and_removes_old_asset() {
        let fx = fixture(Some("http://cdn.test/media/old123.png")).await;

        let result = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: None,
                photo: Some(photo()),
            })
            .await
            .unwrap();

        let new_url = result.account.photo_url.clone().unwrap();
        assert!(new_url.starts_with("http://cdn.test/media/"));
        assert_ne!(new_url, "http://cdn.test/media/old123.png");

        result.photo_cleanup.unwrap().await.unwrap();
        assert_eq!(fx.media.deleted().await, vec!["old123".to_string()]);

        let stored = fx.accounts.find_by_id(&fx.alice.id).await.unwrap().unwrap();
        assert_eq!(stored.photo_url, Some(new_url));
    }

    #[tokio::test]
    async fn first_photo_schedules_no_cleanup() {
        let fx = fixture(None).await;

        let result = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: None,
                photo: Some(photo()),
            })
            .await
            .unwrap();

        assert!(result.account.photo_url.is_some());
        assert!(result.photo_cleanup.is_none());
    }

    #[tokio::test]
    async fn failed_cleanup_does_not_fail_the_update() {
        let fx = fixture(Some("http://cdn.test/media/old.png")).await;
        fx.media.fail_deletes().await;

        let result = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("Renamed".to_string()),
                photo: Some(photo()),
            })
            .await
            .unwrap();

        result.photo_cleanup.unwrap().await.unwrap();
        let stored = fx.accounts.find_by_id(&fx.alice.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(fx.media.deleted().await, vec!["old".to_string()]);
    }

    #[tokio::test]
    async fn rejected_upload_leaves_profile_untouched() {
        let fx = fixture(Some("http://cdn.test/media/old.png")).await;

        let err = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("Renamed".to_string()),
                photo: Some(MediaUpload {
                    file_name: None,
                    content_type: None,
                    bytes: Vec::new(),
                }),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::ValidationFailed { .. }));
        let stored = fx.accounts.find_by_id(&fx.alice.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
        assert!(fx.media.deleted().await.is_empty());
    }

    /// Account store whose profile writes always fail.
    struct FailingUpdates(Arc<InMemoryAccountRepository>);

    #[async_trait::async_trait]
    impl AccountRepository for FailingUpdates {
        async fn save(&self, account: &Account) -> Result<(), DomainError> {
            self.0.save(account).await
        }

        async fn update(&self, _account: &Account) -> Result<(), DomainError> {
            Err(DomainError::database("connection reset"))
        }

        async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
            self.0.find_by_id(id).await
        }

        async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError> {
            self.0.find_by_email(email).await
        }

        async fn add_enrolled_course(
            &self,
            account_id: &AccountId,
            course_id: &CourseId,
        ) -> Result<bool, DomainError> {
            self.0.add_enrolled_course(account_id, course_id).await
        }
    }

    #[tokio::test]
    async fn failed_write_discards_new_upload_and_keeps_old_photo() {
        let fx = fixture(Some("http://cdn.test/media/old.png")).await;
        let handler = UpdateProfileHandler::new(
            Arc::new(FailingUpdates(fx.accounts.clone())),
            Arc::new(fx.media.clone()),
        );

        let err = handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("Renamed".to_string()),
                photo: Some(photo()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::Infrastructure(_)));
        let deleted = fx.media.deleted().await;
        assert_eq!(deleted.len(), 1);
        assert_ne!(deleted[0], "old");
        assert!(!fx.media.contains(&deleted[0]).await);

        let stored = fx.accounts.find_by_id(&fx.alice.id).await.unwrap().unwrap();
        assert_eq!(stored.photo_url.as_deref(), Some("http://cdn.test/media/old.png"));
    }

    #[tokio::test]
    async fn failed_write_without_photo_deletes_nothing() {
        let fx = fixture(Some("http://cdn.test/media/old.png")).await;
        let handler = UpdateProfileHandler::new(
            Arc::new(FailingUpdates(fx.accounts.clone())),
            Arc::new(fx.media.clone()),
        );

        handler
            .handle(UpdateProfileCommand {
                account_id: fx.alice.id,
                name: Some("Renamed".to_string()),
                photo: None,
            })
            .await
            .unwrap_err();

        assert!(fx.media.deleted().await.is_empty());
    }

    #[tokio::test]
    async fn missing_account_is_user_not_found() {
        let fx = fixture(None).await;

        let err = fx
            .handler
            .handle(UpdateProfileCommand {
                account_id: AccountId::new(),
                name: Some("x".to_string()),
                photo: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.message(), "User not found");
    }
}
