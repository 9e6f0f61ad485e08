//! Multipart helpers shared by the upload handlers

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{self, ContentDisposition};
use futures::TryStreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::FILE_FIELD;

/// The `file` part of a multipart body, body not yet read
pub struct FileField {
    pub filename: String,
    pub content_type: Option<String>,
    pub field: Field,
}

fn disposition(field: &Field) -> Option<ContentDisposition> {
    field
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| ContentDisposition::from_raw(value).ok())
}

/// Advance to the `file` field, draining any field before it
pub async fn next_file_field(payload: &mut Multipart) -> Result<FileField> {
    while let Some(mut field) = payload.try_next().await? {
        let Some(cd) = disposition(&field) else {
            drain(&mut field).await?;
            continue;
        };

        if cd.get_name() != Some(FILE_FIELD) {
            drain(&mut field).await?;
            continue;
        }

        let filename = cd
            .get_filename()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::MissingField("`file` field has no filename".to_string()))?;

        let content_type = field
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        return Ok(FileField {
            filename,
            content_type,
            field,
        });
    }

    Err(AppError::MissingField(format!(
        "multipart field `{FILE_FIELD}` is required"
    )))
}

async fn drain(field: &mut Field) -> Result<()> {
    while field.try_next().await?.is_some() {}
    Ok(())
}

/// Stream a field into `file`, returning the byte count
pub async fn write_field<W>(field: &mut Field, file: &mut W, limit: u64) -> Result<u64>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut written: u64 = 0;
    while let Some(chunk) = field.try_next().await? {
        written += chunk.len() as u64;
        if written > limit {
            return Err(AppError::PayloadTooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(written)
}
