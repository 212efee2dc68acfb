use axum::extract::Multipart;

/// A PDF received in the `file` field of a multipart form.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub enum UploadError {
    /// The form was read but had no `file` field.
    Missing,
    /// The multipart stream could not be read.
    Read(String),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::Missing => write!(f, "No file uploaded"),
            UploadError::Read(e) => write!(f, "{e}"),
        }
    }
}

/// Pull the `file` field out of a multipart upload. Other fields are drained
/// and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, UploadError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Read(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadError::Read(format!("Failed to read file data: {}", e)))?
                .to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            let _ = field.bytes().await;
        }
    }

    file.ok_or(UploadError::Missing)
}
