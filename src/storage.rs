// Upload of the test metadata document to S3

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::models::MetadataDocument;

pub const DEFAULT_REGION: &str = "ap-northeast-2";
pub const DEFAULT_BUCKET: &str = "dupilot-dev-media";

pub const ENV_PROFILE: &str = "AWS_PROFILE";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_BUCKET: &str = "AWS_S3_BUCKET";
pub const ENV_ENDPOINT_S3: &str = "AWS_ENDPOINT_URL_S3";
pub const ENV_ENDPOINT: &str = "AWS_ENDPOINT_URL";

/// Where the metadata document goes
#[derive(Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Named profile from the shared AWS config, if any
    pub profile: Option<String>,
    /// Custom endpoint (S3-compatible stores); switches to path-style addressing
    pub endpoint: Option<String>,
}

impl S3Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from a variable lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            bucket: get(ENV_BUCKET).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: get(ENV_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            profile: get(ENV_PROFILE),
            endpoint: get(ENV_ENDPOINT_S3).or_else(|| get(ENV_ENDPOINT)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Failed to start the upload runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("Failed to encode metadata document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Upload to s3://{bucket}/{key} failed: {message}")]
    Put {
        bucket: String,
        key: String,
        message: String,
    },
}

/// Object key of a project's metadata document
pub fn metadata_object_key(project_id: &str) -> String {
    format!("projects/{}/metadata.json", project_id)
}

/// Puts metadata documents into the configured bucket
///
/// The SDK is async; each upload runs on its own current-thread runtime so the
/// rest of the tool stays blocking.
pub struct MetadataUploader {
    settings: S3Settings,
}

impl MetadataUploader {
    pub fn new(settings: S3Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &S3Settings {
        &self.settings
    }

    /// Upload `document` for `project_id` and return the object key
    pub fn upload(&self, project_id: &str, document: &MetadataDocument) -> Result<String, UploadError> {
        let key = metadata_object_key(project_id);
        let body = serde_json::to_vec(document)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.put(&key, body))?;

        log::info!("Uploaded metadata to s3://{}/{}", self.settings.bucket, key);
        Ok(key)
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), UploadError> {
        let client = self.client().await;
        log::debug!("PUT s3://{}/{} ({} bytes)", self.settings.bucket, key, body.len());

        client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| UploadError::Put {
                bucket: self.settings.bucket.clone(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    async fn client(&self) -> aws_sdk_s3::Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.settings.region.clone()));
        if let Some(profile) = &self.settings.profile {
            loader = loader.profile_name(profile);
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired);
        if let Some(endpoint) = &self.settings.endpoint {
            builder = builder.endpoint_url(endpoint.as_str()).force_path_style(true);
        }
        aws_sdk_s3::Client::from_conf(builder.build())
    }
}
