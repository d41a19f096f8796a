pub mod aws;
pub mod docker;
pub mod elb;
pub mod npm;
pub mod s3;
