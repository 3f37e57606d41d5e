//! S3 object storage for encrypted snapshots.
//!
//! Works with AWS S3 and S3-compatible services (MinIO, Wasabi, ...) when
//! an endpoint override is configured.

use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::config::app_config::{StaticCredentials, StorageTarget};
use crate::core::errors::{BackupError, Result, StoreError};
use crate::core::traits::object_store::ObjectStore;

/// Content type of the armored age ciphertext.
const ARMORED_CONTENT_TYPE: &str = "text/plain";

/// Single-request uploader backed by the AWS SDK.
///
/// Uses static credentials only; no session token, no refresh. The SDK is
/// async, so calls run on a private current-thread runtime.
pub struct S3Store {
    client: Client,
    bucket: String,
    runtime: tokio::runtime::Runtime,
}

impl S3Store {
    pub fn new(target: &StorageTarget, credentials: &StaticCredentials) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BackupError::Io)?;

        let creds = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            "static",
        );

        let client = runtime.block_on(async {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(target.region.clone()))
                .credentials_provider(creds)
                .load()
                .await;

            let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
            if let Some(endpoint) = &target.endpoint {
                debug!(endpoint = %endpoint, "using custom S3 endpoint");
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }
            Client::from_conf(builder.build())
        });

        Ok(Self {
            client,
            bucket: target.bucket.clone(),
            runtime,
        })
    }
}

impl ObjectStore for S3Store {
    fn put_file(&self, key: &str, source: &Path) -> std::result::Result<(), StoreError> {
        debug!(bucket = %self.bucket, key, source = %source.display(), "uploading");

        self.runtime.block_on(async {
            let body = ByteStream::from_path(source).await.map_err(|e| {
                StoreError::new(format!("unable to open {}: {e}", source.display()))
            })?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(ARMORED_CONTENT_TYPE)
                .body(body)
                .send()
                .await
                .map_err(|e| StoreError::new(DisplayErrorContext(&e).to_string()))?;

            info!(bucket = %self.bucket, key, "object stored");
            Ok(())
        })
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
