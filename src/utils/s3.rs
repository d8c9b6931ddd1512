use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_types::region::Region;
use log::{error, info};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

// Define the type alias for the upload result
type UploadResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const ALLOWED_PHOTO_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Bucket that serves memory photos under public URLs.
#[derive(Clone)]
pub struct ImageHost {
    client: S3Client,
    bucket: String,
    public_url: String,
}

/// Builds an S3 client; a custom endpoint switches to path-style addressing
/// so S3-compatible hosts (MinIO, R2, ...) work too.
pub async fn create_s3_client(config: &Config) -> S3Client {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &config.s3_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    S3Client::from_conf(builder.build())
}

impl ImageHost {
    pub fn new(client: S3Client, bucket: impl Into<String>, public_url: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_url: public_url.into(),
        }
    }

    pub async fn from_config(config: &Config) -> Self {
        let client = create_s3_client(config).await;
        Self::new(client, config.s3_bucket.clone(), config.s3_public_url.clone())
    }

    pub fn public_url_for(&self, key: &str) -> String {
        join_public_url(&self.public_url, key)
    }

    /// Stores a photo under `{folder}/{uuid}.{ext}` and returns its public URL.
    pub async fn upload_photo(&self, folder: &str, data: Vec<u8>) -> Result<String, AppError> {
        let photo_type = detect_photo_type(&data)?;
        let key = format!("{}/{}.{}", folder, Uuid::now_v7(), photo_type.extension);

        info!("Uploading photo to s3://{}/{}", self.bucket, key);

        // The upload runs detached so a client disconnect cannot abort it halfway.
        let (tx, rx) = oneshot::channel::<UploadResult>();
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let object_key = key.clone();

        tokio::spawn(async move {
            let result = client
                .put_object()
                .bucket(&bucket)
                .key(&object_key)
                .content_type(photo_type.mime_type)
                .body(ByteStream::from(data))
                .send()
                .await;
            let _ = tx.send(result.map(|_| ()).map_err(|err| err.into()));
        });

        match rx.await {
            Ok(Ok(())) => Ok(self.public_url_for(&key)),
            Ok(Err(err)) => {
                error!("Failed to upload to S3: {:?}", err);
                Err(AppError::InternalServerError("Photo upload failed".to_string()))
            }
            Err(_) => {
                error!("Upload task canceled");
                Err(AppError::InternalServerError("Photo upload failed".to_string()))
            }
        }
    }
}

fn join_public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoType {
    pub mime_type: &'static str,
    pub extension: &'static str,
}

/// Sniffs the payload's magic bytes; file names and client MIME types are not trusted.
pub fn detect_photo_type(data: &[u8]) -> Result<PhotoType, AppError> {
    if data.is_empty() {
        return Err(AppError::BadRequest("Photo is empty".to_string()));
    }

    let kind = infer::get(data)
        .ok_or_else(|| AppError::BadRequest("Unable to detect photo type".to_string()))?;

    if !ALLOWED_PHOTO_TYPES.contains(&kind.mime_type()) {
        return Err(AppError::BadRequest(
            "Only JPEG, PNG, WebP and GIF photos are allowed".to_string(),
        ));
    }

    Ok(PhotoType {
        mime_type: kind.mime_type(),
        extension: kind.extension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];
    const JPEG_HEADER: [u8; 12] = [
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
    ];

    #[test]
    fn detects_png_and_jpeg() {
        let png = detect_photo_type(&PNG_HEADER).unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert_eq!(png.extension, "png");

        let jpeg = detect_photo_type(&JPEG_HEADER).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");
        assert_eq!(jpeg.extension, "jpg");
    }

    #[test]
    fn rejects_empty_and_non_image_payloads() {
        assert!(matches!(detect_photo_type(&[]), Err(AppError::BadRequest(_))));
        assert!(detect_photo_type(b"just some text, definitely not a photo").is_err());
        // PDF magic bytes are recognised but not allowed.
        assert!(detect_photo_type(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3").is_err());
    }

    #[test]
    fn public_urls_join_base_and_key() {
        assert_eq!(
            join_public_url("https://cdn.example.com/odyssey/", "memories/abc.jpg"),
            "https://cdn.example.com/odyssey/memories/abc.jpg"
        );
        assert_eq!(
            join_public_url("https://odyssey.s3.us-east-1.amazonaws.com", "/memories/abc.png"),
            "https://odyssey.s3.us-east-1.amazonaws.com/memories/abc.png"
        );
    }
}
