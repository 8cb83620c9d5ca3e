use anyhow::{Context, anyhow};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, error::SdkError};

use crate::application::ports::file_store::{
    FileArea, FileStore, StoredObject, Upload, object_file_name,
};
use crate::bootstrap::config::Config;
use crate::infrastructure::storage::{object_key, public_url, relative_key_path};

pub struct S3FileStore {
    client: Client,
    bucket: String,
    url_base: String,
}

impl S3FileStore {
    pub async fn new(cfg: &Config) -> anyhow::Result<Self> {
        let bucket = cfg
            .s3_bucket
            .clone()
            .context("S3_BUCKET must be configured when STORAGE_BACKEND=s3")?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.s3_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let (Some(access), Some(secret)) = (&cfg.s3_access_key, &cfg.s3_secret_key) {
            let creds = Credentials::new(
                access.clone(),
                secret.clone(),
                None,
                None,
                "market-s3-static",
            );
            builder = builder.credentials_provider(creds);
        }
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if cfg.s3_use_path_style {
            builder = builder.force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        ensure_bucket(&client, &bucket).await?;

        let url_base = object_url_base(
            &bucket,
            cfg.s3_public_url.as_deref(),
            cfg.s3_endpoint.as_deref(),
            cfg.s3_region.as_deref(),
        );
        tracing::info!(bucket = %bucket, url_base = %url_base, "s3 file store ready");

        Ok(Self {
            client,
            bucket,
            url_base,
        })
    }
}

/// Where stored objects are publicly reachable.
fn object_url_base(
    bucket: &str,
    public_url: Option<&str>,
    endpoint: Option<&str>,
    region: Option<&str>,
) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(endpoint) = endpoint {
        return format!("{}/{}", endpoint.trim_end_matches('/'), bucket);
    }
    match region {
        Some(region) => format!("https://{bucket}.s3.{region}.amazonaws.com"),
        None => format!("https://{bucket}.s3.amazonaws.com"),
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn put(&self, area: FileArea, upload: Upload) -> anyhow::Result<StoredObject> {
        let file_name = object_file_name(upload.file_name.as_deref(), upload.content_type.as_deref());
        let key = object_key(area.as_str(), &file_name);
        let content_type = upload
            .content_type
            .clone()
            .filter(|ct| ct != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let size = upload.bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(upload.bytes))
            .send()
            .await
            .with_context(|| format!("failed to upload {key}"))?;
        tracing::debug!(key = %key, bytes = size, "stored upload in s3");
        Ok(StoredObject {
            url: public_url(&self.url_base, &key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        relative_key_path(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key.trim_start_matches('/'))
            .send()
            .await
            .with_context(|| format!("failed to delete {key}"))?;
        Ok(())
    }
}

async fn ensure_bucket(client: &Client, bucket: &str) -> anyhow::Result<()> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => return Ok(()),
        Err(SdkError::ServiceError(service_err)) => {
            if !matches!(service_err.err(), HeadBucketError::NotFound(_)) {
                return Err(anyhow!(service_err.err().to_string()));
            }
        }
        Err(err) => return Err(anyhow!(err.to_string())),
    }

    match client.create_bucket().bucket(bucket).send().await {
        Ok(_) => {
            tracing::info!(bucket = %bucket, "created s3 bucket");
            Ok(())
        }
        Err(SdkError::ServiceError(service_err)) => match service_err.err() {
            CreateBucketError::BucketAlreadyOwnedByYou(_) => Ok(()),
            CreateBucketError::BucketAlreadyExists(_) => Ok(()),
            other => Err(anyhow!(other.to_string())),
        },
        Err(err) => Err(anyhow!(err.to_string())),
    }
}
