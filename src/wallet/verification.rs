//! Identity verification (KYC)
//!
//! `none -> pending` on submission, `pending -> verified | rejected` on an
//! admin decision. A rejected user may submit again; a pending submission
//! is replaced by a new one.

use std::sync::Arc;

use crate::common_utils::{file_extension, get_current_timestamp_ms};
use crate::models::{
    validate_user_id, User, VerificationDecision, VerificationRequest, VerificationStatus,
    WalletError,
};
use crate::services::object_store::{random_object_name, ObjectStore};
use crate::store::{abort, Collection, DocStore};

const VERIFICATION_COLLECTIONS: [Collection; 2] = [Collection::Users, Collection::Verifications];

/// Identity document as uploaded by the user
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct VerificationWorkflow {
    store: Arc<DocStore>,
    objects: Arc<dyn ObjectStore>,
}

impl VerificationWorkflow {
    pub fn new(store: Arc<DocStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    pub async fn submit_verification(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        document: DocumentUpload,
    ) -> Result<VerificationRequest, WalletError> {
        validate_user_id(user_id)?;
        let (first_name, last_name, email) = (first_name.trim(), last_name.trim(), email.trim());
        if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
            return Err(WalletError::validation("first name, last name and email are required"));
        }
        if document.data.is_empty() {
            return Err(WalletError::validation("identity document is required"));
        }

        if let Some(existing) = self.store.get::<VerificationRequest>(Collection::Verifications, user_id)? {
            // a pending or rejected submission is replaced
            if existing.status == VerificationStatus::Verified {
                return Err(WalletError::AlreadyProcessed(format!("verification of {}", user_id)));
            }
        }

        let key = format!(
            "verifications/{}/{}.{}",
            user_id,
            random_object_name(),
            file_extension(&document.file_name, "jpg")
        );
        let document_url = self
            .objects
            .upload_object(&key, document.data, &document.content_type)
            .await
            .map_err(|e| WalletError::external("object store", format!("{:#}", e)))?;

        let now = get_current_timestamp_ms();
        let request = VerificationRequest {
            user_id: user_id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            document_url,
            status: VerificationStatus::Pending,
            created_at: now,
            decided_at: None,
            decided_by: None,
        };

        // a decision may have landed while the document was uploading
        self.store.with_transaction(&VERIFICATION_COLLECTIONS, |tx| {
            if let Some(current) = tx.get::<VerificationRequest>(Collection::Verifications, user_id)? {
                if current.status == VerificationStatus::Verified {
                    return abort(WalletError::AlreadyProcessed(format!("verification of {}", user_id)));
                }
            }
            let mut user = tx
                .get::<User>(Collection::Users, user_id)?
                .unwrap_or_else(|| User::new(user_id, Some(email.to_string()), now));
            user.verification_status = VerificationStatus::Pending;
            tx.put(Collection::Users, user_id, &user)?;
            tx.put(Collection::Verifications, user_id, &request)
        })?;

        log::info!("verification submitted by {}", user_id);
        Ok(request)
    }

    /// Admin decision on a pending request, mirrored onto the user
    pub fn decide_verification(
        &self,
        user_id: &str,
        decision: VerificationDecision,
        admin_id: &str,
    ) -> Result<VerificationRequest, WalletError> {
        validate_user_id(user_id)?;
        let status = VerificationStatus::from(decision);
        let now = get_current_timestamp_ms();

        let request = self.store.with_transaction(&VERIFICATION_COLLECTIONS, |tx| {
            let mut request = match tx.get::<VerificationRequest>(Collection::Verifications, user_id)? {
                Some(r) => r,
                None => return abort(WalletError::NotFound(format!("verification of {}", user_id))),
            };
            if request.status != VerificationStatus::Pending {
                return abort(WalletError::AlreadyProcessed(format!("verification of {}", user_id)));
            }

            request.status = status;
            request.decided_at = Some(now);
            request.decided_by = Some(admin_id.to_string());
            tx.put(Collection::Verifications, user_id, &request)?;

            if let Some(mut user) = tx.get::<User>(Collection::Users, user_id)? {
                user.verification_status = status;
                tx.put(Collection::Users, user_id, &user)?;
            }
            Ok(request)
        })?;

        log::info!("verification of {} set to {} by {}", user_id, status, admin_id);
        Ok(request)
    }

    /// All submissions, newest first
    pub fn list_verifications(&self) -> Result<Vec<VerificationRequest>, WalletError> {
        let mut requests: Vec<VerificationRequest> = self.store.scan(Collection::Verifications)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MemoryObjectStore;
    use anyhow::Result;
    use async_trait::async_trait;

    fn workflow() -> (VerificationWorkflow, Arc<DocStore>, Arc<MemoryObjectStore>) {
        let store = Arc::new(DocStore::temporary().unwrap());
        let objects = Arc::new(MemoryObjectStore::new());
        (VerificationWorkflow::new(store.clone(), objects.clone()), store, objects)
    }

    fn passport() -> DocumentUpload {
        DocumentUpload {
            file_name: "passport.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_submission_marks_user_pending() {
        let (wf, store, objects) = workflow();
        let request = wf
            .submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap();

        assert_eq!(request.status, VerificationStatus::Pending);
        let keys = objects.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("verifications/u1/"));
        assert!(keys[0].ends_with(".png"));

        let user: User = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(user.verification_status, VerificationStatus::Pending);
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn test_empty_document_rejected() {
        let (wf, _, objects) = workflow();
        let mut doc = passport();
        doc.data.clear();
        let err = wf
            .submit_verification("u1", "Ada", "Lovelace", "ada@example.com", doc)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)));
        assert!(objects.keys().is_empty());
    }

    #[tokio::test]
    async fn test_decision_only_from_pending() {
        let (wf, store, _) = workflow();
        wf.submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap();

        let decided = wf
            .decide_verification("u1", VerificationDecision::Rejected, "admin-1")
            .unwrap();
        assert_eq!(decided.status, VerificationStatus::Rejected);
        let user: User = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(user.verification_status, VerificationStatus::Rejected);

        let err = wf
            .decide_verification("u1", VerificationDecision::Verified, "admin-1")
            .unwrap_err();
        assert!(matches!(err, WalletError::AlreadyProcessed(_)));

        // resubmission after rejection goes back to pending
        wf.submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap();
        let verified = wf
            .decide_verification("u1", VerificationDecision::Verified, "admin-1")
            .unwrap();
        assert_eq!(verified.status, VerificationStatus::Verified);
        assert_eq!(wf.list_verifications().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_verified_user_cannot_resubmit() {
        let (wf, _, _) = workflow();
        wf.submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap();
        wf.decide_verification("u1", VerificationDecision::Verified, "admin-1").unwrap();

        let err = wf
            .submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::AlreadyProcessed(_)));
    }

    #[test]
    fn test_decide_without_submission() {
        let (wf, _, _) = workflow();
        let err = wf
            .decide_verification("u1", VerificationDecision::Verified, "admin-1")
            .unwrap_err();
        assert!(matches!(err, WalletError::NotFound(_)));
    }

    /// Approves the pending request of `user_id` while an upload is in flight
    struct DecidingObjectStore {
        admin: VerificationWorkflow,
        user_id: String,
    }

    #[async_trait]
    impl ObjectStore for DecidingObjectStore {
        async fn upload_object(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> Result<String> {
            self.admin
                .decide_verification(&self.user_id, VerificationDecision::Verified, "admin-1")?;
            Ok(format!("memory://{}", key))
        }
    }

    #[tokio::test]
    async fn test_decision_during_upload_is_kept() {
        let (wf, store, _) = workflow();
        wf.submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap();

        let admin = VerificationWorkflow::new(store.clone(), Arc::new(MemoryObjectStore::new()));
        let racing = VerificationWorkflow::new(
            store.clone(),
            Arc::new(DecidingObjectStore { admin, user_id: "u1".to_string() }),
        );
        let err = racing
            .submit_verification("u1", "Ada", "Lovelace", "ada@example.com", passport())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::AlreadyProcessed(_)));

        let request: VerificationRequest =
            store.get(Collection::Verifications, "u1").unwrap().unwrap();
        assert_eq!(request.status, VerificationStatus::Verified);
        let user: User = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(user.verification_status, VerificationStatus::Verified);
    }
}
