//! Object storage for uploaded scans.
//!
//! [`ObjectStore`] wraps an S3-compatible bucket (DigitalOcean Spaces,
//! MinIO, or AWS S3 proper). Uploads are public-read; the returned URL is
//! stored on the scan row and read later by workflow blocks. Configuration
//! comes from environment variables; if `SPACES_BUCKET` is not set,
//! [`StoreConfig::from_env`] returns `None` and the upload endpoint should
//! reject requests as unconfigured.

use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;

/// Default S3-compatible endpoint host.
const DEFAULT_ENDPOINT: &str = "nyc3.digitaloceanspaces.com";

/// Default region for endpoints that require one.
const DEFAULT_REGION: &str = "us-east-1";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for object storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The upload request was rejected or the transport failed.
    #[error("Object upload failed: {0}")]
    Upload(String),
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Configuration for the S3-compatible object store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Bucket name.
    pub bucket: String,
    /// Endpoint host, e.g. `nyc3.digitaloceanspaces.com`.
    pub endpoint: String,
    /// Region identifier (defaults to `us-east-1`).
    pub region: String,
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SPACES_BUCKET` is not set, signalling that object
    /// storage is not configured.
    ///
    /// | Variable          | Required | Default                       |
    /// |-------------------|----------|-------------------------------|
    /// | `SPACES_BUCKET`   | yes      | —                             |
    /// | `SPACES_ENDPOINT` | no       | `nyc3.digitaloceanspaces.com` |
    /// | `SPACES_REGION`   | no       | `us-east-1`                   |
    /// | `SPACES_KEY`      | no       | empty                         |
    /// | `SPACES_SECRET`   | no       | empty                         |
    pub fn from_env() -> Option<Self> {
        let bucket = std::env::var("SPACES_BUCKET").ok()?;
        Some(Self {
            bucket,
            endpoint: std::env::var("SPACES_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            region: std::env::var("SPACES_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            access_key: std::env::var("SPACES_KEY").unwrap_or_default(),
            secret_key: std::env::var("SPACES_SECRET").unwrap_or_default(),
        })
    }
}

// ---------------------------------------------------------------------------
// ObjectStore
// ---------------------------------------------------------------------------

/// S3-compatible object store client for scan uploads.
pub struct ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl ObjectStore {
    /// Build a client from configuration.
    pub fn new(config: StoreConfig) -> Self {
        let credentials = Credentials::from_keys(&config.access_key, &config.secret_key, None);
        let s3_config = aws_sdk_s3::config::Builder::new()
            .endpoint_url(format!("https://{}", config.endpoint))
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket,
            endpoint: config.endpoint,
        }
    }

    /// Upload bytes under `key` with the given content type.
    ///
    /// The object is stored public-read; returns the durable public URL in
    /// the virtual-hosted style the Spaces endpoints serve.
    pub async fn put_public(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .acl(aws_sdk_s3::types::ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let url = self.object_url(key);
        tracing::info!(key, url = %url, "Object uploaded");
        Ok(url)
    }

    /// Public URL for an object key.
    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.endpoint, key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_bucket() {
        std::env::remove_var("SPACES_BUCKET");
        assert!(StoreConfig::from_env().is_none());
    }

    #[test]
    fn object_url_is_virtual_hosted_style() {
        let store = ObjectStore::new(StoreConfig {
            bucket: "scans".to_string(),
            endpoint: "nyc3.digitaloceanspaces.com".to_string(),
            region: "us-east-1".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
        });
        assert_eq!(
            store.object_url("scans/1-chest.png"),
            "https://scans.nyc3.digitaloceanspaces.com/scans/1-chest.png"
        );
    }
}
