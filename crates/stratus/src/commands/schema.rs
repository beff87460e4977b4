use crate::output;
use stratus_cloud::Resource;
use stratus_cloud_aws::{AwsConfig, AwsProvider, guardduty, s3};

pub async fn handle(config: &AwsConfig, type_name: &str) -> anyhow::Result<()> {
    let provider = AwsProvider::from_config(config).await?;

    let schema = match type_name {
        guardduty::RESOURCE_TYPE => provider.invite_accepter().schema(),
        s3::RESOURCE_TYPE => provider.bucket_object().schema(),
        other => anyhow::bail!(
            "unknown resource type {:?} (available: {}, {})",
            other,
            guardduty::RESOURCE_TYPE,
            s3::RESOURCE_TYPE
        ),
    };

    output::print_json(&schema)
}
