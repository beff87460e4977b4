//! Field schema declarations
//!
//! Each resource describes its fields (type, required/optional/computed,
//! force-new, conflicts and value validators) so that the orchestrating
//! layer can validate configuration and plan replacements without knowing
//! the resource's Rust types.

use crate::error::{CloudError, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Schema of a single resource type
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    /// Resource type name (e.g., "aws_s3_bucket_object")
    pub type_name: &'static str,

    /// Whether an existing remote entity can be adopted by its identity key
    pub importable: bool,

    /// Declared fields
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            importable: false,
            fields: Vec::new(),
        }
    }

    pub fn importable(mut self) -> Self {
        self.importable = true;
        self
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate a value against the named field's validator
    pub fn validate(&self, name: &str, value: &str) -> Result<()> {
        match self.get(name) {
            Some(field) => field.validate(value),
            None => Err(CloudError::Validation(format!(
                "{}: unknown field {:?}",
                self.type_name, name
            ))),
        }
    }
}

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    StringMap,
}

/// Declaration of a single field
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing this field forces the resource to be replaced
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub conflicts_with: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<Validator>,
}

impl FieldSchema {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            default: None,
            conflicts_with: &[],
            validator: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn string_map(name: &'static str) -> Self {
        Self::new(name, FieldKind::StringMap)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn conflicts_with(mut self, fields: &'static [&'static str]) -> Self {
        self.conflicts_with = fields;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Check a value against this field's validator, if any
    pub fn validate(&self, value: &str) -> Result<()> {
        match &self.validator {
            Some(validator) => validator
                .check(value)
                .map_err(|reason| CloudError::Validation(format!("{}: {}", self.name, reason))),
            None => Ok(()),
        }
    }
}

/// Value validators shared across resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "values")]
pub enum Validator {
    /// 12-digit account identifier
    AccountId,
    /// `arn:<partition>:<service>:<region>:<account>:<resource>`
    Arn,
    /// One of a fixed set of values
    OneOf(&'static [&'static str]),
}

impl Validator {
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        match self {
            Validator::AccountId => {
                if is_account_id(value) {
                    Ok(())
                } else {
                    Err(format!("{:?} is not a valid account ID (12 digits)", value))
                }
            }
            Validator::Arn => check_arn(value),
            Validator::OneOf(allowed) => {
                if allowed.contains(&value) {
                    Ok(())
                } else {
                    Err(format!(
                        "expected one of [{}], got {:?}",
                        allowed.join(", "),
                        value
                    ))
                }
            }
        }
    }
}

pub fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

static PARTITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^aws(-[a-z]+)*$").unwrap());
static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d$").unwrap());
static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{12}$").unwrap());

fn check_arn(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }

    let parts: Vec<&str> = value.splitn(6, ':').collect();
    let [prefix, partition, service, region, account, resource] = parts.as_slice() else {
        return Err(format!("{:?} is not a valid ARN", value));
    };
    if *prefix != "arn" {
        return Err(format!("{:?} is not a valid ARN", value));
    }

    if !PARTITION_RE.is_match(partition) {
        return Err(format!("{:?} is not a valid partition in ARN", partition));
    }
    if service.is_empty() {
        return Err(format!("{:?} is missing a service in ARN", value));
    }
    if !region.is_empty() && !REGION_RE.is_match(region) {
        return Err(format!("{:?} is not a valid region in ARN", region));
    }
    if !account.is_empty() && !ACCOUNT_RE.is_match(account) {
        return Err(format!("{:?} is not a valid account ID in ARN", account));
    }
    if resource.is_empty() {
        return Err(format!("{:?} is missing a resource in ARN", value));
    }

    Ok(())
}
