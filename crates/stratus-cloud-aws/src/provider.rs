//! AWS provider
//!
//! Owns the service clients and hands out resource adapters wired to them.

use crate::api::{GuardDutyApi, KeyMetadataApi, ObjectStorageApi};
use crate::config::{AwsConfig, Partition};
use crate::guardduty::InviteAccepter;
use crate::s3::BucketObject;
use crate::sdk::SdkClients;
use std::sync::Arc;
use stratus_cloud::Result;

/// AWS provider
pub struct AwsProvider {
    guardduty: Arc<dyn GuardDutyApi>,
    s3: Arc<dyn ObjectStorageApi>,
    kms: Arc<dyn KeyMetadataApi>,
    region: Option<String>,
    /// Explicit tag policy; otherwise derived from the region's partition
    tags_override: Option<bool>,
}

impl AwsProvider {
    /// Create a provider over explicit API implementations
    pub fn new(
        guardduty: Arc<dyn GuardDutyApi>,
        s3: Arc<dyn ObjectStorageApi>,
        kms: Arc<dyn KeyMetadataApi>,
    ) -> Self {
        Self {
            guardduty,
            s3,
            kms,
            region: None,
            tags_override: None,
        }
    }

    /// Resolve credentials and region, then build SDK-backed clients
    pub async fn from_config(config: &AwsConfig) -> Result<Self> {
        let sdk_config = config.load_sdk_config().await;
        let region = sdk_config.region().map(|r| r.to_string());
        let tags_restricted = config.object_tags_restricted(region.as_deref());
        let tags_override = config.restrict_object_tags;

        tracing::debug!(
            region = ?region,
            partition = %region.as_deref().map(Partition::for_region).unwrap_or_default(),
            endpoint = ?config.endpoint_url,
            tags_restricted,
            "Loaded AWS configuration"
        );

        let clients = Arc::new(SdkClients::from_sdk_config(
            &sdk_config,
            config.endpoint_url.as_deref(),
        ));

        Ok(Self {
            guardduty: clients.clone(),
            s3: clients.clone(),
            kms: clients,
            region,
            tags_override,
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Fix the tag policy regardless of region
    pub fn with_tags_restricted(mut self, restricted: bool) -> Self {
        self.tags_override = Some(restricted);
        self
    }

    pub fn name(&self) -> &str {
        "aws"
    }

    /// Resolved region, if any
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn tags_restricted(&self) -> bool {
        self.tags_override.unwrap_or_else(|| {
            self.region
                .as_deref()
                .map(Partition::for_region)
                .unwrap_or_default()
                .restricts_object_tags()
        })
    }

    pub fn invite_accepter(&self) -> InviteAccepter {
        InviteAccepter::new(self.guardduty.clone())
    }

    pub fn bucket_object(&self) -> BucketObject {
        BucketObject::new(self.s3.clone(), self.kms.clone())
            .with_tags_restricted(self.tags_restricted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::{BucketObjectConfig, ContentSource};
    use crate::testing::{FakeGuardDuty, FakeKms, FakeObjectStorage};
    use stratus_cloud::Resource;

    fn provider() -> AwsProvider {
        AwsProvider::new(
            Arc::new(FakeGuardDuty::default()),
            Arc::new(FakeObjectStorage::default()),
            Arc::new(FakeKms::default()),
        )
    }

    #[test]
    fn test_region_sets_tag_policy() {
        let provider = provider().with_region("cn-north-1");
        assert_eq!(provider.region(), Some("cn-north-1"));
        assert!(provider.tags_restricted());

        let provider = provider.with_region("us-west-2");
        assert!(!provider.tags_restricted());
    }

    #[test]
    fn test_explicit_tag_policy_survives_region_change() {
        let provider = provider().with_tags_restricted(false).with_region("cn-north-1");
        assert!(!provider.tags_restricted());

        let provider = provider.with_region("us-east-1").with_tags_restricted(true);
        assert!(provider.tags_restricted());
        let provider = provider.with_region("us-west-2");
        assert!(provider.tags_restricted());
    }

    #[tokio::test]
    async fn test_bucket_object_uses_explicit_tag_policy() {
        let provider = provider().with_tags_restricted(false).with_region("cn-north-1");

        let mut config =
            BucketObjectConfig::new("bucket", "key", ContentSource::Inline("x".into()));
        config.tags.insert("Name".into(), "x".into());

        let state = provider.bucket_object().create(&config).await.unwrap();
        assert_eq!(state.config.tags, config.tags);
    }

    #[tokio::test]
    async fn test_bucket_object_inherits_tag_policy() {
        let provider = provider().with_region("cn-northwest-1");

        let mut config =
            BucketObjectConfig::new("bucket", "key", ContentSource::Inline("x".into()));
        config.tags.insert("Name".into(), "x".into());

        let err = provider.bucket_object().create(&config).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_adapter_type_names() {
        let provider = provider();
        assert_eq!(provider.name(), "aws");
        assert_eq!(
            provider.invite_accepter().type_name(),
            "aws_guardduty_invite_accepter"
        );
        assert_eq!(provider.bucket_object().type_name(), "aws_s3_bucket_object");
    }
}
