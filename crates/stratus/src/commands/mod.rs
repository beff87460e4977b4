pub mod guardduty;
pub mod s3_object;
pub mod schema;
