mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stratus_cloud_aws::AwsConfig;
use stratus_cloud_aws::s3::{ObjectAcl, ServerSideEncryption, StorageClass};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratus", version)]
#[command(about = "Manage GuardDuty invitations and S3 objects as typed resources", long_about = None)]
struct Cli {
    /// AWS region (AWS_REGION)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Named AWS profile (AWS_PROFILE)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Custom service endpoint, e.g. LocalStack (STRATUS_AWS_ENDPOINT_URL)
    #[arg(long, global = true)]
    endpoint_url: Option<String>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GuardDuty invite accepter (aws_guardduty_invite_accepter)
    #[command(subcommand)]
    GuarddutyInvite(InviteCommand),

    /// S3 bucket object (aws_s3_bucket_object)
    #[command(subcommand)]
    S3Object(ObjectCommand),

    /// Print the field schema of a resource type as JSON
    Schema {
        /// Resource type name
        type_name: String,
    },
}

#[derive(Subcommand)]
pub enum InviteCommand {
    /// Wait for the invitation from the master account and accept it
    Accept {
        /// Member detector ID
        #[arg(long)]
        detector_id: String,
        /// Master AWS account ID
        #[arg(long)]
        master_id: String,
        /// How long to wait for the invitation to appear
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Show the current association (<detector_id>:<master_id>)
    Read { id: String },
    /// Adopt an existing association (<detector_id>:<master_id>)
    Import { id: String },
    /// Disassociate the detector from its master account
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ObjectCommand {
    /// Upload an object
    Put(PutArgs),
    /// Show object metadata and tags
    Read {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
    },
    /// Delete an object (every version when --version-id is given)
    Delete {
        #[arg(long)]
        bucket: String,
        #[arg(long)]
        key: String,
        /// Recorded version ID; deletes all versions of the key
        #[arg(long)]
        version_id: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct PutArgs {
    #[arg(long)]
    pub bucket: String,
    #[arg(long)]
    pub key: String,

    /// Local file to upload
    #[arg(long, conflicts_with_all = ["content", "content_base64"])]
    pub source: Option<PathBuf>,
    /// Literal UTF-8 content
    #[arg(long, conflicts_with = "content_base64")]
    pub content: Option<String>,
    /// Base64-encoded binary content
    #[arg(long)]
    pub content_base64: Option<String>,

    #[arg(long, default_value = "private")]
    pub acl: ObjectAcl,
    #[arg(long)]
    pub storage_class: Option<StorageClass>,
    #[arg(long)]
    pub cache_control: Option<String>,
    #[arg(long)]
    pub content_type: Option<String>,
    #[arg(long)]
    pub content_encoding: Option<String>,
    #[arg(long)]
    pub content_language: Option<String>,
    #[arg(long)]
    pub content_disposition: Option<String>,
    #[arg(long)]
    pub server_side_encryption: Option<ServerSideEncryption>,
    #[arg(long)]
    pub kms_key_id: Option<String>,
    /// Expected content hash
    #[arg(long)]
    pub etag: Option<String>,
    #[arg(long)]
    pub website_redirect: Option<String>,

    /// Object tag, repeatable
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = commands::s3_object::parse_tag)]
    pub tags: Vec<(String, String)>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AwsConfig::from_env()?.merge(AwsConfig {
        region: cli.region,
        profile: cli.profile,
        endpoint_url: cli.endpoint_url,
        restrict_object_tags: None,
    });
    tracing::debug!(?config, "Resolved AWS configuration");

    match cli.command {
        Commands::GuarddutyInvite(command) => commands::guardduty::handle(&config, command).await?,
        Commands::S3Object(command) => commands::s3_object::handle(&config, command).await?,
        Commands::Schema { type_name } => commands::schema::handle(&config, &type_name).await?,
    }

    Ok(())
}
