pub mod jwt;
pub mod pagination;
pub mod s3;
pub mod validation;
