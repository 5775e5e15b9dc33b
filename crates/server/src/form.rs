use actix_multipart::{Field, Multipart};
use futures::StreamExt;
use recap_common::{RecapError, Result};
use recap_llm::SummarizeOptions;
use recap_loader::{Input, UploadedFile};
use std::path::Path;
use tracing::debug;

use crate::pipeline::SummarizeRequest;

/// Largest accepted text field, in bytes
const MAX_TEXT_FIELD: usize = 64 * 1024;

/// Read the summarize form into a request
///
/// Field names: `file`, `video_url`, `api_key`, `use_advanced_model`,
/// `find_clusters`. An uploaded file wins over a video URL. The upload is
/// streamed into a temp file under `upload_dir` that lives as long as the
/// returned request; uploads over `max_upload_bytes` are rejected.
pub async fn read_summarize_form(
    mut payload: Multipart,
    upload_dir: &Path,
    max_upload_bytes: u64,
) -> Result<SummarizeRequest> {
    let mut upload: Option<UploadedFile> = None;
    let mut video_url = String::new();
    let mut api_key = String::new();
    let mut options = SummarizeOptions::default();

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(form_error)?;
        let name = field.name().to_string();

        match name.as_str() {
            "file" => {
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or_default()
                    .to_string();

                // Browsers send an empty part when no file was chosen
                if filename.is_empty() {
                    drain(&mut field).await?;
                    continue;
                }

                let mut file = UploadedFile::create(upload_dir, &filename)?;
                let mut written: u64 = 0;
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(form_error)?;
                    written += chunk.len() as u64;
                    if written > max_upload_bytes {
                        return Err(RecapError::invalid_input(format!(
                            "Uploaded file is larger than {} bytes",
                            max_upload_bytes
                        )));
                    }
                    file.write_chunk(&chunk)?;
                }
                file.finish()?;

                if file.size()? == 0 {
                    debug!("Ignoring empty upload '{}'", filename);
                    continue;
                }
                upload = Some(file);
            }
            "video_url" => video_url = read_text(&mut field).await?,
            "api_key" => api_key = read_text(&mut field).await?,
            "use_advanced_model" => options.use_advanced_model = is_checked(&read_text(&mut field).await?),
            "find_clusters" => options.find_clusters = is_checked(&read_text(&mut field).await?),
            other => {
                debug!("Ignoring unknown form field '{}'", other);
                drain(&mut field).await?;
            }
        }
    }

    let video_url = video_url.trim();
    let input = match upload {
        Some(file) => Some(Input::Upload(file)),
        None if !video_url.is_empty() => Some(Input::VideoUrl(video_url.to_string())),
        None => None,
    };

    Ok(SummarizeRequest {
        input,
        api_key,
        options,
    })
}

/// Checkbox values browsers and API clients send
fn is_checked(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

async fn read_text(field: &mut Field) -> Result<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(form_error)?;
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD {
            return Err(RecapError::invalid_input(format!(
                "Form field '{}' is too long",
                field.name()
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes)
        .map_err(|_| RecapError::invalid_input(format!("Form field '{}' is not UTF-8", field.name())))
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(form_error)?;
    }
    Ok(())
}

fn form_error(e: actix_multipart::MultipartError) -> RecapError {
    RecapError::invalid_input(format!("Malformed form data: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_checked() {
        assert!(is_checked("on"));
        assert!(is_checked("TRUE"));
        assert!(is_checked(" 1 "));
        assert!(!is_checked(""));
        assert!(!is_checked("off"));
        assert!(!is_checked("false"));
    }
}
