//! AWS provider configuration

use aws_config::{BehaviorVersion, Region};
use serde::{Deserialize, Serialize};
use std::fmt;
use stratus_cloud::{CloudError, Result};

const REGION_ENV: &str = "AWS_REGION";
const PROFILE_ENV: &str = "AWS_PROFILE";
const ENDPOINT_ENV: &str = "STRATUS_AWS_ENDPOINT_URL";
const RESTRICT_TAGS_ENV: &str = "STRATUS_RESTRICT_OBJECT_TAGS";

/// AWS partition a region belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partition {
    #[default]
    Aws,
    AwsCn,
    AwsUsGov,
}

impl Partition {
    pub fn for_region(region: &str) -> Self {
        if region.starts_with("cn-") {
            Partition::AwsCn
        } else if region.starts_with("us-gov-") {
            Partition::AwsUsGov
        } else {
            Partition::Aws
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Partition::Aws => "aws",
            Partition::AwsCn => "aws-cn",
            Partition::AwsUsGov => "aws-us-gov",
        }
    }

    /// Whether S3 object tagging is unavailable in this partition
    pub fn restricts_object_tags(&self) -> bool {
        matches!(self, Partition::AwsCn)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for connecting to AWS
#[derive(Debug, Clone, Default)]
pub struct AwsConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
    /// Custom endpoint (e.g. LocalStack)
    pub endpoint_url: Option<String>,
    /// Explicit override of the partition's object tag policy
    pub restrict_object_tags: Option<bool>,
}

impl AwsConfig {
    /// Create AwsConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let restrict_object_tags = match non_empty_env(RESTRICT_TAGS_ENV) {
            Some(value) => Some(parse_bool(RESTRICT_TAGS_ENV, &value)?),
            None => None,
        };

        Ok(Self {
            region: non_empty_env(REGION_ENV),
            profile: non_empty_env(PROFILE_ENV),
            endpoint_url: non_empty_env(ENDPOINT_ENV),
            restrict_object_tags,
        })
    }

    /// Overlay explicitly given values on top of this configuration
    pub fn merge(mut self, other: AwsConfig) -> Self {
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.profile.is_some() {
            self.profile = other.profile;
        }
        if other.endpoint_url.is_some() {
            self.endpoint_url = other.endpoint_url;
        }
        if other.restrict_object_tags.is_some() {
            self.restrict_object_tags = other.restrict_object_tags;
        }
        self
    }

    /// Whether object tags are disallowed for the given resolved region
    pub fn object_tags_restricted(&self, region: Option<&str>) -> bool {
        self.restrict_object_tags
            .unwrap_or_else(|| region.map(Partition::for_region).unwrap_or_default().restricts_object_tags())
    }

    /// Load the shared SDK configuration
    pub async fn load_sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        loader.load().await
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(CloudError::Validation(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}
