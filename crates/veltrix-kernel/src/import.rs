//! Decoding of uploaded files.
//!
//! Decoding is the only asynchronous step of an import and touches no
//! session state: the result is inserted afterwards by
//! [`Vfs::insert_import`](crate::vfs::Vfs::insert_import), which searches for a
//! free name against the tree as it is at that moment. Two overlapping
//! imports of the same name therefore both land under distinct names.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use veltrix_types::Language;

use crate::error::{Result, VfsError};
use crate::language::{classify, image_mime};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decoded payload of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPayload {
    Text(String),
    DataUrl(String),
}

/// An upload ready to be inserted into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImport {
    /// Trimmed suggested name, before collision suffixing.
    pub name: String,
    pub language: Language,
    pub payload: ImportPayload,
}

/// Decode raw upload bytes on the blocking pool.
///
/// Images become `data:<mime>;base64,…`; everything else must be valid
/// UTF-8 (a leading byte-order mark is dropped). Failures reject the import
/// instead of inserting a half-formed entry.
pub async fn decode_import(bytes: Vec<u8>, suggested_name: &str) -> Result<DecodedImport> {
    let name = suggested_name.trim().to_string();
    if name.is_empty() {
        return Err(VfsError::Decode {
            name,
            reason: "empty file name".to_string(),
        });
    }
    let language = classify(&name);

    let task_name = name.clone();
    let payload = tokio::task::spawn_blocking(move || decode_payload(bytes, language, &task_name))
        .await
        .map_err(|e| VfsError::Decode {
            name: name.clone(),
            reason: format!("decode task failed: {e}"),
        })??;

    tracing::debug!(name = %name, %language, "decoded import");
    Ok(DecodedImport {
        name,
        language,
        payload,
    })
}

fn decode_payload(bytes: Vec<u8>, language: Language, name: &str) -> Result<ImportPayload> {
    if language.is_image() {
        let url = format!("data:{};base64,{}", image_mime(name), STANDARD.encode(&bytes));
        return Ok(ImportPayload::DataUrl(url));
    }

    let bytes = if bytes.starts_with(UTF8_BOM) {
        bytes[UTF8_BOM.len()..].to_vec()
    } else {
        bytes
    };
    String::from_utf8(bytes)
        .map(ImportPayload::Text)
        .map_err(|e| VfsError::Decode {
            name: name.to_string(),
            reason: format!("not valid UTF-8 text: {}", e.utf8_error()),
        })
}
