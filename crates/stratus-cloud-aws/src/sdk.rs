//! AWS SDK implementations of the API seams

use crate::api::{
    GuardDutyApi, Invitation, InvitationPage, KeyMetadataApi, MasterAccount, ObjectMetadata,
    ObjectStorageApi, ObjectVersion, PutObjectRequest, PutObjectResponse,
};
use crate::error::{ApiResult, ServiceError};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use std::collections::BTreeMap;

/// Convert an SDK failure into a [`ServiceError`]
fn service_error<E>(operation: &'static str, err: SdkError<E>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .or_else(|| Some(DisplayErrorContext(&err).to_string()));

    ServiceError {
        operation,
        code,
        message,
        status,
    }
}

/// SDK clients for every service the adapters use
#[derive(Clone)]
pub struct SdkClients {
    guardduty: aws_sdk_guardduty::Client,
    s3: aws_sdk_s3::Client,
    kms: aws_sdk_kms::Client,
}

impl SdkClients {
    pub fn new(
        guardduty: aws_sdk_guardduty::Client,
        s3: aws_sdk_s3::Client,
        kms: aws_sdk_kms::Client,
    ) -> Self {
        Self { guardduty, s3, kms }
    }

    /// Build all clients from one shared SDK configuration
    pub fn from_sdk_config(config: &aws_config::SdkConfig, endpoint_url: Option<&str>) -> Self {
        let guardduty = {
            let mut builder = aws_sdk_guardduty::config::Builder::from(config);
            if let Some(endpoint) = endpoint_url {
                builder = builder.endpoint_url(endpoint);
            }
            aws_sdk_guardduty::Client::from_conf(builder.build())
        };

        let s3 = {
            let mut builder = aws_sdk_s3::config::Builder::from(config);
            if let Some(endpoint) = endpoint_url {
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }
            aws_sdk_s3::Client::from_conf(builder.build())
        };

        let kms = {
            let mut builder = aws_sdk_kms::config::Builder::from(config);
            if let Some(endpoint) = endpoint_url {
                builder = builder.endpoint_url(endpoint);
            }
            aws_sdk_kms::Client::from_conf(builder.build())
        };

        Self::new(guardduty, s3, kms)
    }
}

#[async_trait]
impl GuardDutyApi for SdkClients {
    async fn list_invitations(&self, next_token: Option<String>) -> ApiResult<InvitationPage> {
        let output = self
            .guardduty
            .list_invitations()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| service_error("ListInvitations", e))?;

        Ok(InvitationPage {
            invitations: output
                .invitations()
                .iter()
                .map(|i| Invitation {
                    account_id: i.account_id().map(str::to_string),
                    invitation_id: i.invitation_id().map(str::to_string),
                    relationship_status: i.relationship_status().map(str::to_string),
                })
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn accept_invitation(
        &self,
        detector_id: &str,
        invitation_id: &str,
        master_id: &str,
    ) -> ApiResult<()> {
        self.guardduty
            .accept_administrator_invitation()
            .detector_id(detector_id)
            .invitation_id(invitation_id)
            .administrator_id(master_id)
            .send()
            .await
            .map_err(|e| service_error("AcceptInvitation", e))?;
        Ok(())
    }

    async fn get_master_account(&self, detector_id: &str) -> ApiResult<Option<MasterAccount>> {
        let output = self
            .guardduty
            .get_administrator_account()
            .detector_id(detector_id)
            .send()
            .await
            .map_err(|e| service_error("GetMasterAccount", e))?;

        Ok(output.administrator().map(|a| MasterAccount {
            account_id: a.account_id().map(str::to_string),
            invitation_id: a.invitation_id().map(str::to_string),
            relationship_status: a.relationship_status().map(str::to_string),
        }))
    }

    async fn disassociate_from_master_account(&self, detector_id: &str) -> ApiResult<()> {
        self.guardduty
            .disassociate_from_administrator_account()
            .detector_id(detector_id)
            .send()
            .await
            .map_err(|e| service_error("DisassociateFromMasterAccount", e))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStorageApi for SdkClients {
    async fn put_object(&self, request: PutObjectRequest) -> ApiResult<PutObjectResponse> {
        use aws_sdk_s3::types::{ObjectCannedAcl, ServerSideEncryption, StorageClass};

        let output = self
            .s3
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .acl(ObjectCannedAcl::from(request.acl.as_str()))
            .body(ByteStream::from(request.body))
            .set_storage_class(
                request
                    .storage_class
                    .map(|c| StorageClass::from(c.as_str())),
            )
            .set_cache_control(request.cache_control)
            .set_content_type(request.content_type)
            .set_content_encoding(request.content_encoding)
            .set_content_language(request.content_language)
            .set_content_disposition(request.content_disposition)
            .set_server_side_encryption(
                request
                    .server_side_encryption
                    .map(|s| ServerSideEncryption::from(s.as_str())),
            )
            .set_ssekms_key_id(request.kms_key_id)
            .set_tagging(request.tagging)
            .set_website_redirect_location(request.website_redirect)
            .send()
            .await
            .map_err(|e| service_error("PutObject", e))?;

        Ok(PutObjectResponse {
            etag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> ApiResult<ObjectMetadata> {
        let output = self
            .s3
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("HeadObject", e))?;

        Ok(ObjectMetadata {
            cache_control: output.cache_control().map(str::to_string),
            content_disposition: output.content_disposition().map(str::to_string),
            content_encoding: output.content_encoding().map(str::to_string),
            content_language: output.content_language().map(str::to_string),
            content_type: output.content_type().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
            server_side_encryption: output
                .server_side_encryption()
                .map(|s| s.as_str().to_string()),
            website_redirect: output.website_redirect_location().map(str::to_string),
            kms_key_id: output.ssekms_key_id().map(str::to_string),
            etag: output.e_tag().map(str::to_string),
            storage_class: output.storage_class().map(|c| c.as_str().to_string()),
        })
    }

    async fn get_object_tagging(
        &self,
        bucket: &str,
        key: &str,
    ) -> ApiResult<BTreeMap<String, String>> {
        let output = self
            .s3
            .get_object_tagging()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| service_error("GetObjectTagging", e))?;

        Ok(output
            .tag_set()
            .iter()
            .map(|t| (t.key().to_string(), t.value().to_string()))
            .collect())
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> ApiResult<Vec<ObjectVersion>> {
        let mut versions = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let output = self
                .s3
                .list_object_versions()
                .bucket(bucket)
                .prefix(prefix)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_id_marker.take())
                .send()
                .await
                .map_err(|e| service_error("ListObjectVersions", e))?;

            versions.extend(output.versions().iter().map(|v| ObjectVersion {
                key: v.key().map(str::to_string),
                version_id: v.version_id().map(str::to_string),
                is_latest: v.is_latest().unwrap_or(false),
            }));

            if !output.is_truncated().unwrap_or(false) {
                break;
            }
            key_marker = output.next_key_marker().map(str::to_string);
            version_id_marker = output.next_version_id_marker().map(str::to_string);
            if key_marker.is_none() && version_id_marker.is_none() {
                break;
            }
        }

        Ok(versions)
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> ApiResult<()> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(str::to_string))
            .send()
            .await
            .map_err(|e| service_error("DeleteObject", e))?;
        Ok(())
    }
}

#[async_trait]
impl KeyMetadataApi for SdkClients {
    async fn describe_key_arn(&self, key_id: &str) -> ApiResult<Option<String>> {
        let output = self
            .kms
            .describe_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(|e| service_error("DescribeKey", e))?;

        Ok(output
            .key_metadata()
            .and_then(|m| m.arn())
            .map(str::to_string))
    }
}
