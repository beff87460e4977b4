use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use stratus_cloud_aws::api::{
    Invitation, InvitationPage, MasterAccount, ObjectMetadata, ObjectVersion, PutObjectRequest,
    PutObjectResponse,
};
use stratus_cloud_aws::{
    ApiResult, AwsProvider, GuardDutyApi, KeyMetadataApi, ObjectStorageApi, ServiceError,
};

pub const DEFAULT_KEY_ARN: &str =
    "arn:aws:kms:eu-west-1:111111111111:key/11111111-2222-3333-4444-555555555555";

/// Versioned object store plus a single GuardDuty member account
#[derive(Default)]
pub struct MemoryAws {
    /// Object versions per key, newest last
    pub objects: Mutex<HashMap<String, Vec<(String, PutObjectRequest)>>>,
    pub invitations: Mutex<Vec<Invitation>>,
    pub master: Mutex<Option<String>>,
    next_version: Mutex<u32>,
}

impl MemoryAws {
    pub fn provider(self: &Arc<Self>) -> AwsProvider {
        AwsProvider::new(self.clone(), self.clone(), self.clone())
    }

    pub fn invite(&self, account_id: &str, invitation_id: &str) {
        self.invitations.lock().unwrap().push(Invitation {
            account_id: Some(account_id.to_string()),
            invitation_id: Some(invitation_id.to_string()),
            relationship_status: Some("Invited".to_string()),
        });
    }

    pub fn version_count(&self, key: &str) -> usize {
        self.objects.lock().unwrap().get(key).map_or(0, Vec::len)
    }

    fn latest(&self, key: &str) -> Option<(String, PutObjectRequest)> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .and_then(|versions| versions.last().cloned())
    }
}

fn not_found(operation: &'static str) -> ServiceError {
    ServiceError::new(operation).with_status(404).with_code("NotFound")
}

#[async_trait]
impl GuardDutyApi for MemoryAws {
    async fn list_invitations(&self, _next_token: Option<String>) -> ApiResult<InvitationPage> {
        Ok(InvitationPage {
            invitations: self.invitations.lock().unwrap().clone(),
            next_token: None,
        })
    }

    async fn accept_invitation(
        &self,
        _detector_id: &str,
        invitation_id: &str,
        master_id: &str,
    ) -> ApiResult<()> {
        self.invitations
            .lock()
            .unwrap()
            .retain(|i| i.invitation_id.as_deref() != Some(invitation_id));
        *self.master.lock().unwrap() = Some(master_id.to_string());
        Ok(())
    }

    async fn get_master_account(&self, _detector_id: &str) -> ApiResult<Option<MasterAccount>> {
        Ok(self.master.lock().unwrap().clone().map(|account_id| MasterAccount {
            account_id: Some(account_id),
            invitation_id: None,
            relationship_status: Some("Enabled".to_string()),
        }))
    }

    async fn disassociate_from_master_account(&self, _detector_id: &str) -> ApiResult<()> {
        *self.master.lock().unwrap() = None;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorageApi for MemoryAws {
    async fn put_object(&self, request: PutObjectRequest) -> ApiResult<PutObjectResponse> {
        let version_id = {
            let mut next = self.next_version.lock().unwrap();
            *next += 1;
            format!("v{}", *next)
        };
        let etag = format!("\"{:x}\"", request.body.len() * 31 + version_id.len());
        self.objects
            .lock()
            .unwrap()
            .entry(request.key.clone())
            .or_default()
            .push((version_id.clone(), request));

        Ok(PutObjectResponse {
            etag: Some(etag),
            version_id: Some(version_id),
        })
    }

    async fn head_object(&self, _bucket: &str, key: &str) -> ApiResult<ObjectMetadata> {
        let (version_id, request) = self.latest(key).ok_or_else(|| not_found("HeadObject"))?;
        let kms_key_id = request
            .server_side_encryption
            .as_ref()
            .filter(|s| s.as_str() == "aws:kms")
            .map(|_| request.kms_key_id.clone().unwrap_or_else(|| DEFAULT_KEY_ARN.to_string()));

        Ok(ObjectMetadata {
            cache_control: request.cache_control.clone(),
            content_type: Some(
                request
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "binary/octet-stream".to_string()),
            ),
            version_id: Some(version_id.clone()),
            server_side_encryption: request.server_side_encryption.map(String::from),
            kms_key_id,
            etag: Some(format!("\"{:x}\"", request.body.len() * 31 + version_id.len())),
            storage_class: request
                .storage_class
                .map(String::from)
                .filter(|c| c != "STANDARD"),
            ..Default::default()
        })
    }

    async fn get_object_tagging(
        &self,
        _bucket: &str,
        key: &str,
    ) -> ApiResult<BTreeMap<String, String>> {
        let (_, request) = self.latest(key).ok_or_else(|| not_found("GetObjectTagging"))?;
        Ok(request
            .tagging
            .map(|t| url::form_urlencoded::parse(t.as_bytes()).into_owned().collect())
            .unwrap_or_default())
    }

    async fn list_object_versions(
        &self,
        _bucket: &str,
        prefix: &str,
    ) -> ApiResult<Vec<ObjectVersion>> {
        let objects = self.objects.lock().unwrap();
        let mut listed = Vec::new();
        for (key, versions) in objects.iter().filter(|(k, _)| k.starts_with(prefix)) {
            for (i, (version_id, _)) in versions.iter().enumerate().rev() {
                listed.push(ObjectVersion {
                    key: Some(key.clone()),
                    version_id: Some(version_id.clone()),
                    is_latest: i + 1 == versions.len(),
                });
            }
        }
        Ok(listed)
    }

    async fn delete_object(
        &self,
        _bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> ApiResult<()> {
        let mut objects = self.objects.lock().unwrap();
        match version_id {
            Some(version_id) => {
                if let Some(versions) = objects.get_mut(key) {
                    versions.retain(|(v, _)| v != version_id);
                    if versions.is_empty() {
                        objects.remove(key);
                    }
                }
            }
            None => {
                objects.remove(key);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl KeyMetadataApi for MemoryAws {
    async fn describe_key_arn(&self, _key_id: &str) -> ApiResult<Option<String>> {
        Ok(Some(DEFAULT_KEY_ARN.to_string()))
    }
}
