//! Resume intake: turns an uploaded PDF resume into the plain `resumeText`
//! the pipeline verifies against.

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub resume_text: String,
}

/// POST /api/v1/resume-text/extract
///
/// Multipart upload with a `file` field holding a PDF.
pub async fn handle_extract_resume_text(
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        let size = data.len();
        let resume_text = extract_in_background(data).await?;
        info!(
            "Extracted {} chars of resume text from {} byte PDF",
            resume_text.len(),
            size
        );
        return Ok(Json(ExtractResponse { resume_text }));
    }

    Err(AppError::Validation(format!(
        "Missing '{FILE_FIELD}' field in upload"
    )))
}

/// PDF parsing is CPU-bound and may panic on malformed input, so it runs on the
/// blocking pool. A panic surfaces as `AppError::Internal`.
pub async fn extract_in_background(data: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
}

pub fn extract_pdf_text(data: &[u8]) -> Result<String, AppError> {
    if !data.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "Uploaded file is not a PDF".to_string(),
        ));
    }

    let raw = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;

    let text = normalize_extracted_text(&raw);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "PDF contains no extractable text (is it a scanned image?)".to_string(),
        ));
    }
    Ok(text)
}

/// Trims each line and collapses runs of blank lines to one.
pub fn normalize_extracted_text(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line });
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "\n\nAda Lovelace   \n\n\n\nAnalyst, Acme\n  \n- Increased revenue by 15%\n\n\n";
        assert_eq!(
            normalize_extracted_text(raw),
            "Ada Lovelace\n\nAnalyst, Acme\n\n- Increased revenue by 15%"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_extracted_text(" \n\n \t\n"), "");
    }

    /// Single-page PDF with one line of Helvetica text and a correct xref table.
    fn single_line_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    #[tokio::test]
    async fn test_extracts_text_from_pdf() {
        let pdf = single_line_pdf("Ada Lovelace");
        let text = extract_in_background(Bytes::from(pdf)).await.unwrap();
        assert!(text.contains("Ada Lovelace"), "got {text:?}");
    }

    #[tokio::test]
    async fn test_truncated_pdf_is_an_error_not_a_crash() {
        let mut pdf = single_line_pdf("Ada Lovelace");
        pdf.truncate(40);
        let result = extract_in_background(Bytes::from(pdf)).await;
        assert!(matches!(
            result,
            Err(AppError::UnprocessableEntity(_)) | Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_non_pdf_rejected_in_background() {
        let result = extract_in_background(Bytes::from_static(b"plain text resume")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_non_pdf_rejected() {
        assert!(matches!(
            extract_pdf_text(b"PK\x03\x04 docx bytes"),
            Err(AppError::Validation(_))
        ));
    }
}
