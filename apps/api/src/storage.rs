//! Object storage for uploaded CV files (S3 / MinIO).

use aws_config::Region;
use aws_sdk_s3::{config::Credentials, primitives::ByteStream, Client as S3Client};
use bytes::Bytes;
use tracing::{error, info};

use crate::config::Config;
use crate::errors::AppError;

#[derive(Clone)]
pub struct FileStore {
    client: S3Client,
    bucket: String,
}

impl FileStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload of {key} failed: {e}")))?;

        info!("Stored CV file at s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Removes an object. Failures are logged, not returned.
    pub async fn remove(&self, key: &str) {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => info!("Cleaned up file s3://{}/{}", self.bucket, key),
            Err(e) => error!("File cleanup error for {key}: {e}"),
        }
    }
}

/// Object key for a stored CV: `cvs/<session>/<stored name>`.
pub fn cv_object_key(session_id: &str, stored_name: &str) -> String {
    format!("cvs/{session_id}/{stored_name}")
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
pub async fn build_s3_client(config: &Config) -> S3Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "mentorpath-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    S3Client::from_conf(s3_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_object_key() {
        assert_eq!(
            cv_object_key("sess_1_abc", "f.pdf"),
            "cvs/sess_1_abc/f.pdf"
        );
    }
}
