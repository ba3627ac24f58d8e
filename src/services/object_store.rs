use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use rand::RngCore;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::common_utils::file_extension;
use crate::configure::ObjectStoreConfig;

/// Write-once storage for uploaded images
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return its public URL
    async fn upload_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Random object name: 32 random bytes, hex encoded
pub fn random_object_name() -> String {
    let mut raw = [0u8; 32];
    rand::rng().fill_bytes(&mut raw);
    hex::encode(raw)
}

/// Key of an ad-hoc upload, e.g. `simple-uploads/4f1c...e0.png`
pub fn simple_upload_key(file_name: &str) -> String {
    format!("simple-uploads/{}.{}", random_object_name(), file_extension(file_name, "unknown"))
}

/// Upload a file under a fresh random name
pub async fn upload_file(
    store: &dyn ObjectStore,
    file_name: &str,
    data: Vec<u8>,
    content_type: &str,
) -> Result<String> {
    if data.is_empty() {
        bail!("no file provided");
    }
    store.upload_object(&simple_upload_key(file_name), data, content_type).await
}

fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

/// S3-compatible bucket (Backblaze B2, MinIO, AWS)
pub struct S3Service {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl S3Service {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self> {
        if config.bucket.is_empty() || config.endpoint.is_empty() {
            bail!("object store bucket and endpoint must be configured");
        }

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: normalize_endpoint(&config.endpoint),
        };

        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )?;

        let bucket = Bucket::new(&config.bucket, region, credentials)
            .context("invalid bucket configuration")?
            .with_path_style();

        Ok(S3Service {
            bucket: Box::new(bucket),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket.name(), key)
    }
}

#[async_trait]
impl ObjectStore for S3Service {
    async fn upload_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .with_context(|| format!("upload of {} failed", key))?;

        if response.status_code() != 200 {
            bail!("upload of {} failed with status {}", key, response.status_code());
        }

        log::info!("uploaded {} ({} bytes)", key, data.len());
        Ok(self.public_url(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_object_name() {
        let a = random_object_name();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, random_object_name());
    }

    #[test]
    fn test_simple_upload_key() {
        let key = simple_upload_key("banner.png");
        assert!(key.starts_with("simple-uploads/"));
        assert!(key.ends_with(".png"));
        assert!(simple_upload_key("blob").ends_with(".unknown"));
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(
            normalize_endpoint("s3.us-east-005.backblazeb2.com"),
            "https://s3.us-east-005.backblazeb2.com"
        );
        assert_eq!(normalize_endpoint("http://localhost:9000"), "http://localhost:9000");
    }

    #[test]
    fn test_public_url() {
        let config = ObjectStoreConfig {
            bucket: "betting-assets".to_string(),
            region: "us-east-005".to_string(),
            endpoint: "s3.us-east-005.backblazeb2.com".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            public_base_url: "https://f005.backblazeb2.com/file/".to_string(),
        };
        let service = S3Service::new(&config).unwrap();
        assert_eq!(
            service.public_url("verifications/u1/ab.jpg"),
            "https://f005.backblazeb2.com/file/betting-assets/verifications/u1/ab.jpg"
        );
    }

    #[test]
    fn test_unconfigured_bucket_is_rejected() {
        let config = ObjectStoreConfig {
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_base_url: String::new(),
        };
        assert!(S3Service::new(&config).is_err());
    }
}
