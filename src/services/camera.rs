use super::ImageCapture;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::PathBuf;

/// Stands in for a camera by re-reading an image file on every capture
pub struct FileImageCapture {
    path: PathBuf,
}

impl FileImageCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageCapture for FileImageCapture {
    async fn prepare(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            ScoutError::Capture(format!("image {} unavailable: {}", self.path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(ScoutError::Capture(format!(
                "{} is not a file",
                self.path.display()
            )));
        }
        Ok(())
    }

    async fn capture(&self) -> Result<String> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ScoutError::Capture(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        if bytes.is_empty() {
            return Err(ScoutError::Capture(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        log::debug!("📷 Captured {} bytes from {}", bytes.len(), self.path.display());
        Ok(STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_capture_encodes_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hi").unwrap();

        let camera = FileImageCapture::new(file.path());
        camera.prepare().await.unwrap();
        assert_eq!(camera.capture().await.unwrap(), "aGk=");
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let camera = FileImageCapture::new("/nonexistent/frame.jpg");
        assert!(matches!(camera.prepare().await, Err(ScoutError::Capture(_))));
        assert!(matches!(camera.capture().await, Err(ScoutError::Capture(_))));
    }
}
