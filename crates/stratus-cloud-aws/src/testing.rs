//! In-memory fakes of the API seams for unit tests

use crate::api::{
    GuardDutyApi, Invitation, InvitationPage, KeyMetadataApi, MasterAccount, ObjectMetadata,
    ObjectStorageApi, ObjectVersion, PutObjectRequest, PutObjectResponse,
};
use crate::error::{ApiResult, ServiceError};
use crate::s3::{ServerSideEncryption, StorageClass};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

pub const DEFAULT_S3_KEY_ARN: &str =
    "arn:aws:kms:us-west-2:123456789012:key/00000000-0000-0000-0000-000000000000";

pub fn invitation(account_id: &str, invitation_id: &str) -> Invitation {
    Invitation {
        account_id: Some(account_id.to_string()),
        invitation_id: Some(invitation_id.to_string()),
        relationship_status: Some("Invited".to_string()),
    }
}

// ========== GuardDuty ==========

#[derive(Default)]
pub struct FakeGuardDuty {
    /// Pages served once the invitation becomes visible; page `n` links to `n + 1`
    pub pages: Mutex<Vec<Vec<Invitation>>>,
    /// Number of full listings that come back empty before `pages` are served
    pub hidden_listings: AtomicU32,
    pub list_error: Mutex<Option<ServiceError>>,
    pub accept_error: Mutex<Option<ServiceError>>,
    pub get_error: Mutex<Option<ServiceError>>,
    pub disassociate_error: Mutex<Option<ServiceError>>,
    pub master: Mutex<Option<MasterAccount>>,

    pub list_calls: Mutex<Vec<Option<String>>>,
    pub accepted: Mutex<Vec<(String, String, String)>>,
    pub disassociated: Mutex<Vec<String>>,
}

impl FakeGuardDuty {
    pub fn with_pages(pages: Vec<Vec<Invitation>>) -> Self {
        Self {
            pages: Mutex::new(pages),
            ..Default::default()
        }
    }

    pub fn set_master(&self, account_id: &str) {
        *self.master.lock().unwrap() = Some(MasterAccount {
            account_id: Some(account_id.to_string()),
            invitation_id: Some("inv-1".to_string()),
            relationship_status: Some("Enabled".to_string()),
        });
    }
}

#[async_trait]
impl GuardDutyApi for FakeGuardDuty {
    async fn list_invitations(&self, next_token: Option<String>) -> ApiResult<InvitationPage> {
        self.list_calls.lock().unwrap().push(next_token.clone());
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }

        if next_token.is_none() && self.hidden_listings.load(Ordering::SeqCst) > 0 {
            self.hidden_listings.fetch_sub(1, Ordering::SeqCst);
            return Ok(InvitationPage::default());
        }

        let pages = self.pages.lock().unwrap();
        let index: usize = next_token.as_deref().map_or(0, |t| t.parse().unwrap());
        let invitations = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());

        Ok(InvitationPage {
            invitations,
            next_token,
        })
    }

    async fn accept_invitation(
        &self,
        detector_id: &str,
        invitation_id: &str,
        master_id: &str,
    ) -> ApiResult<()> {
        if let Some(err) = self.accept_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.accepted.lock().unwrap().push((
            detector_id.to_string(),
            invitation_id.to_string(),
            master_id.to_string(),
        ));
        self.set_master(master_id);
        Ok(())
    }

    async fn get_master_account(&self, _detector_id: &str) -> ApiResult<Option<MasterAccount>> {
        if let Some(err) = self.get_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.master.lock().unwrap().clone())
    }

    async fn disassociate_from_master_account(&self, detector_id: &str) -> ApiResult<()> {
        if let Some(err) = self.disassociate_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.disassociated.lock().unwrap().push(detector_id.to_string());
        *self.master.lock().unwrap() = None;
        Ok(())
    }
}

// ========== S3 ==========

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub request: PutObjectRequest,
    pub etag: String,
    pub version_id: Option<String>,
}

#[derive(Default)]
pub struct FakeObjectStorage {
    pub objects: Mutex<HashMap<(String, String), StoredObject>>,
    pub versioned: bool,
    /// Versions returned by ListObjectVersions
    pub versions: Mutex<Vec<ObjectVersion>>,
    /// Version id whose deletion fails
    pub failing_version: Mutex<Option<String>>,
    pub head_error: Mutex<Option<ServiceError>>,
    pub tagging_error: Mutex<Option<ServiceError>>,
    /// Overrides the KMS key id HeadObject reports
    pub reported_kms_key: Mutex<Option<String>>,

    pub put_calls: Mutex<Vec<PutObjectRequest>>,
    pub head_calls: AtomicU32,
    pub tagging_calls: AtomicU32,
    pub deleted: Mutex<Vec<(String, Option<String>)>>,
    counter: AtomicU32,
}

impl FakeObjectStorage {
    pub fn versioned() -> Self {
        Self {
            versioned: true,
            ..Default::default()
        }
    }

    pub fn stored(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn not_found(operation: &'static str) -> ServiceError {
        ServiceError::new(operation)
            .with_status(404)
            .with_code("NotFound")
            .with_message("Not Found")
    }
}

#[async_trait]
impl ObjectStorageApi for FakeObjectStorage {
    async fn put_object(&self, request: PutObjectRequest) -> ApiResult<PutObjectResponse> {
        self.put_calls.lock().unwrap().push(request.clone());

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let etag = format!("etag-{n}");
        let version_id = self.versioned.then(|| format!("version-{n}"));

        self.objects.lock().unwrap().insert(
            (request.bucket.clone(), request.key.clone()),
            StoredObject {
                request,
                etag: etag.clone(),
                version_id: version_id.clone(),
            },
        );

        Ok(PutObjectResponse {
            etag: Some(format!("\"{etag}\"")),
            version_id,
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ApiResult<ObjectMetadata> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.head_error.lock().unwrap().clone() {
            return Err(err);
        }

        let object = self
            .stored(bucket, key)
            .ok_or_else(|| Self::not_found("HeadObject"))?;
        let request = &object.request;

        let server_side_encryption = request.server_side_encryption.clone();
        let kms_key_id = match &server_side_encryption {
            Some(ServerSideEncryption::AwsKms) => Some(
                self.reported_kms_key
                    .lock()
                    .unwrap()
                    .clone()
                    .or_else(|| request.kms_key_id.clone())
                    .unwrap_or_else(|| DEFAULT_S3_KEY_ARN.to_string()),
            ),
            _ => None,
        };

        Ok(ObjectMetadata {
            cache_control: request.cache_control.clone(),
            content_disposition: request.content_disposition.clone(),
            content_encoding: request.content_encoding.clone(),
            content_language: request.content_language.clone(),
            content_type: Some(
                request
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "binary/octet-stream".to_string()),
            ),
            version_id: object.version_id.clone(),
            server_side_encryption: server_side_encryption.map(|s| s.as_str().to_string()),
            website_redirect: request.website_redirect.clone(),
            kms_key_id,
            etag: Some(format!("\"{}\"", object.etag)),
            storage_class: request
                .storage_class
                .clone()
                .filter(|c| *c != StorageClass::Standard)
                .map(|c| c.as_str().to_string()),
        })
    }

    async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> ApiResult<BTreeMap<String, String>> {
        self.tagging_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.tagging_error.lock().unwrap().clone() {
            return Err(err);
        }

        let object = self
            .stored(bucket, key)
            .ok_or_else(|| Self::not_found("GetObjectTagging"))?;
        Ok(object
            .request
            .tagging
            .as_deref()
            .map(|t| url::form_urlencoded::parse(t.as_bytes()).into_owned().collect())
            .unwrap_or_default())
    }

    async fn list_object_versions(
        &self,
        _bucket: &str,
        prefix: &str,
    ) -> ApiResult<Vec<ObjectVersion>> {
        Ok(self
            .versions
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.key.as_deref().is_some_and(|k| k.starts_with(prefix)))
            .cloned()
            .collect())
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> ApiResult<()> {
        if version_id.is_some() && self.failing_version.lock().unwrap().as_deref() == version_id {
            return Err(ServiceError::new("DeleteObject")
                .with_status(403)
                .with_code("AccessDenied")
                .with_message("Access Denied"));
        }

        self.deleted
            .lock()
            .unwrap()
            .push((key.to_string(), version_id.map(str::to_string)));
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

// ========== KMS ==========

pub struct FakeKms {
    pub default_arn: String,
    pub describe_calls: AtomicU32,
    pub error: Mutex<Option<ServiceError>>,
}

impl Default for FakeKms {
    fn default() -> Self {
        Self {
            default_arn: DEFAULT_S3_KEY_ARN.to_string(),
            describe_calls: AtomicU32::new(0),
            error: Mutex::new(None),
        }
    }
}

#[async_trait]
impl KeyMetadataApi for FakeKms {
    async fn describe_key_arn(&self, key_id: &str) -> ApiResult<Option<String>> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }
        assert_eq!(key_id, "alias/aws/s3");
        Ok(Some(self.default_arn.clone()))
    }
}
