use crate::output;
use crate::{ObjectCommand, PutArgs};
use anyhow::Context;
use colored::Colorize;
use stratus_cloud::Resource;
use stratus_cloud_aws::{AwsConfig, AwsProvider, BucketObjectConfig, BucketObjectState, ContentSource};

pub async fn handle(config: &AwsConfig, command: ObjectCommand) -> anyhow::Result<()> {
    match command {
        ObjectCommand::Put(args) => {
            // Reject bad content flags before resolving credentials
            let object_config = put_config(args)?;

            let provider = AwsProvider::from_config(config).await?;
            eprintln!(
                "Uploading {}...",
                format!("s3://{}/{}", object_config.bucket, object_config.key).cyan()
            );
            let state = provider
                .bucket_object()
                .create(&object_config)
                .await
                .context("failed to put S3 object")?;

            output::success(&format!("Uploaded {} (etag {:?})", state.id, state.remote_etag));
            output::print_json(&state)
        }
        ObjectCommand::Read { bucket, key } => {
            let provider = AwsProvider::from_config(config).await?;
            let state = placeholder_state(&bucket, &key, None);
            let current = provider
                .bucket_object()
                .read(&state)
                .await?
                .map(|state| metadata_view(&state))
                .transpose()?;
            output::print_state(current.as_ref(), &format!("s3://{}/{}", bucket, key))
        }
        ObjectCommand::Delete {
            bucket,
            key,
            version_id,
        } => {
            let provider = AwsProvider::from_config(config).await?;
            let state = placeholder_state(&bucket, &key, version_id);
            provider
                .bucket_object()
                .delete(&state)
                .await
                .context("failed to delete S3 object")?;

            output::success(&format!("Deleted s3://{}/{}", bucket, key));
            Ok(())
        }
    }
}

fn put_config(args: PutArgs) -> anyhow::Result<BucketObjectConfig> {
    let content = ContentSource::from_fields(args.source, args.content, args.content_base64)?;

    let mut config = BucketObjectConfig::new(args.bucket, args.key, content);
    config.acl = args.acl;
    config.storage_class = args.storage_class;
    config.cache_control = args.cache_control;
    config.content_type = args.content_type;
    config.content_encoding = args.content_encoding;
    config.content_language = args.content_language;
    config.content_disposition = args.content_disposition;
    config.server_side_encryption = args.server_side_encryption;
    config.kms_key_id = args.kms_key_id;
    config.etag = args.etag;
    config.website_redirect = args.website_redirect;
    config.tags = args.tags.into_iter().collect();

    config.validate()?;
    Ok(config)
}

/// State for an object known only by location
fn placeholder_state(bucket: &str, key: &str, version_id: Option<String>) -> BucketObjectState {
    BucketObjectState {
        id: key.to_string(),
        config: BucketObjectConfig::new(bucket, key, ContentSource::Inline(String::new())),
        version_id,
        remote_etag: None,
    }
}

/// Read output without the content fields, which S3 never reports back
fn metadata_view(state: &BucketObjectState) -> anyhow::Result<serde_json::Value> {
    let mut value = serde_json::to_value(state)?;
    if let Some(fields) = value.as_object_mut() {
        for name in ["source", "content", "content_base64"] {
            fields.remove(name);
        }
    }
    Ok(value)
}

/// Parse a `KEY=VALUE` tag argument
pub fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", raw)),
    }
}
