//! S3 enumerated field values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canned ACL applied to an uploaded object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    AwsExecRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl ObjectAcl {
    pub const VALUES: &'static [&'static str] = &[
        "private",
        "public-read",
        "public-read-write",
        "authenticated-read",
        "aws-exec-read",
        "bucket-owner-read",
        "bucket-owner-full-control",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
            ObjectAcl::PublicReadWrite => "public-read-write",
            ObjectAcl::AuthenticatedRead => "authenticated-read",
            ObjectAcl::AwsExecRead => "aws-exec-read",
            ObjectAcl::BucketOwnerRead => "bucket-owner-read",
            ObjectAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl FromStr for ObjectAcl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(ObjectAcl::Private),
            "public-read" => Ok(ObjectAcl::PublicRead),
            "public-read-write" => Ok(ObjectAcl::PublicReadWrite),
            "authenticated-read" => Ok(ObjectAcl::AuthenticatedRead),
            "aws-exec-read" => Ok(ObjectAcl::AwsExecRead),
            "bucket-owner-read" => Ok(ObjectAcl::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(ObjectAcl::BucketOwnerFullControl),
            other => Err(format!(
                "invalid acl {:?}, expected one of: {}",
                other,
                Self::VALUES.join(", ")
            )),
        }
    }
}

impl fmt::Display for ObjectAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage tier of an object
///
/// S3 may report classes this crate does not accept as input; those are kept
/// verbatim in `Other` so a read never fails on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StorageClass {
    #[default]
    Standard,
    ReducedRedundancy,
    OnezoneIa,
    StandardIa,
    Other(String),
}

impl StorageClass {
    pub const VALUES: &'static [&'static str] =
        &["STANDARD", "REDUCED_REDUNDANCY", "ONEZONE_IA", "STANDARD_IA"];

    pub fn as_str(&self) -> &str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::ReducedRedundancy => "REDUCED_REDUNDANCY",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::Other(value) => value,
        }
    }

    /// Whether the value may be requested on upload
    pub fn is_settable(&self) -> bool {
        !matches!(self, StorageClass::Other(_))
    }
}

impl From<String> for StorageClass {
    fn from(value: String) -> Self {
        match value.as_str() {
            "STANDARD" => StorageClass::Standard,
            "REDUCED_REDUNDANCY" => StorageClass::ReducedRedundancy,
            "ONEZONE_IA" => StorageClass::OnezoneIa,
            "STANDARD_IA" => StorageClass::StandardIa,
            _ => StorageClass::Other(value),
        }
    }
}

impl From<StorageClass> for String {
    fn from(value: StorageClass) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for StorageClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match StorageClass::from(s.to_string()) {
            StorageClass::Other(other) => Err(format!(
                "invalid storage class {:?}, expected one of: {}",
                other,
                Self::VALUES.join(", ")
            )),
            class => Ok(class),
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At-rest encryption mode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerSideEncryption {
    Aes256,
    AwsKms,
    Other(String),
}

impl ServerSideEncryption {
    pub const VALUES: &'static [&'static str] = &["AES256", "aws:kms"];

    pub fn as_str(&self) -> &str {
        match self {
            ServerSideEncryption::Aes256 => "AES256",
            ServerSideEncryption::AwsKms => "aws:kms",
            ServerSideEncryption::Other(value) => value,
        }
    }

    pub fn is_settable(&self) -> bool {
        !matches!(self, ServerSideEncryption::Other(_))
    }
}

impl From<String> for ServerSideEncryption {
    fn from(value: String) -> Self {
        match value.as_str() {
            "AES256" => ServerSideEncryption::Aes256,
            "aws:kms" => ServerSideEncryption::AwsKms,
            _ => ServerSideEncryption::Other(value),
        }
    }
}

impl From<ServerSideEncryption> for String {
    fn from(value: ServerSideEncryption) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ServerSideEncryption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ServerSideEncryption::from(s.to_string()) {
            ServerSideEncryption::Other(other) => Err(format!(
                "invalid server side encryption {:?}, expected one of: {}",
                other,
                Self::VALUES.join(", ")
            )),
            sse => Ok(sse),
        }
    }
}

impl fmt::Display for ServerSideEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
