use crate::db::queries;
use crate::errors::AppError;
use crate::models::{DocumentKind, TechnicianDocument};
use crate::state::AppState;

const BUCKET: &str = "documents";

/// Stores a verification document for a technician and records where it lives.
pub async fn upload_technician_document(
    state: &AppState,
    technician_id: &str,
    kind: DocumentKind,
    filename: Option<&str>,
    bytes: &[u8],
) -> Result<TechnicianDocument, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("document is empty".to_string()));
    }

    {
        let db = state.conn()?;
        if queries::get_technician(&db, technician_id)?.is_none() {
            return Err(AppError::NotFound(format!("technician {technician_id}")));
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    let path = match filename.and_then(extension) {
        Some(ext) => format!("technicians/{technician_id}/{}-{id}.{ext}", kind.as_str()),
        None => format!("technicians/{technician_id}/{}-{id}", kind.as_str()),
    };

    let url = state
        .blobs
        .upload(BUCKET, &path, bytes)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let document = TechnicianDocument {
        id,
        technician_id: technician_id.to_string(),
        kind,
        url,
        uploaded_at: chrono::Utc::now().naive_utc(),
    };

    {
        let db = state.conn()?;
        queries::insert_technician_document(&db, &document)?;
    }

    tracing::info!(technician_id, kind = kind.as_str(), "technician document uploaded");
    Ok(document)
}

/// Lower-cased extension of `filename`, if it is short and alphanumeric.
fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("aadhar.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension("scan.final.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("evil.p/hp"), None);
        assert_eq!(extension("trailing."), None);
    }
}
