//! Food recognition from gzip-compressed photos.

pub mod ws;

use std::io::Read;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use flate2::read::GzDecoder;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::AppError,
    genai::{ContentKind, GenerationRequest, InlineImage},
    state::AppState,
};

/// Keyword used when a multipart upload carries none.
pub const DEFAULT_KEYWORD: &str = "foodid";

const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

pub fn decompress(compressed: &[u8]) -> Result<Bytes, AppError> {
    let mut out = Vec::new();
    GzDecoder::new(compressed)
        .take(MAX_IMAGE_BYTES + 1)
        .read_to_end(&mut out)
        .map_err(|e| AppError::validation("image", format!("not a gzip payload: {e}")))?;
    if out.len() as u64 > MAX_IMAGE_BYTES {
        return Err(AppError::validation("image", "image too large"));
    }
    Ok(Bytes::from(out))
}

/// Image type from magic bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => Some("image/heic"),
        _ => None,
    }
}

/// Builds the vision request for `keyword` from a compressed upload.
pub fn prepare(keyword: &str, compressed: &[u8]) -> Result<GenerationRequest, AppError> {
    let kind = ContentKind::from_image_keyword(keyword)
        .ok_or_else(|| AppError::validation("keyword", format!("unknown keyword '{keyword}'")))?;
    let prompt = kind.image_prompt().unwrap_or_default();
    let data = decompress(compressed)?;
    let mime_type =
        sniff_mime(&data).ok_or_else(|| AppError::validation("image", "unsupported image format"))?;
    Ok(GenerationRequest::with_image(
        kind,
        prompt,
        InlineImage { mime_type, data },
    ))
}

#[derive(Debug, Serialize)]
pub struct InferenceResponse {
    pub message: &'static str,
    pub data: Value,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/img-inf", post(image_inference))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES as usize))
}

#[instrument(skip(state, mp))]
pub async fn image_inference(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<InferenceResponse>, AppError> {
    let mut image: Option<Bytes> = None;
    let mut keyword: Option<String> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation("multipart", e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation("image", e.to_string()))?,
                )
            }
            Some("keyword") => {
                keyword = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation("keyword", e.to_string()))?,
                )
            }
            _ => {}
        }
    }
    let image = image.ok_or_else(|| AppError::validation("image", "is required"))?;
    let keyword = keyword
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());

    let req = prepare(&keyword, &image)?;
    let data = state.generator.generate(req).await?;
    info!(user_id = %user_id, keyword = %keyword.trim(), "image processed");
    Ok(Json(InferenceResponse {
        message: "image processed successfully",
        data,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::Write;

    pub(crate) const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime(JPEG), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n"), Some("image/png"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"\0\0\0\x18ftypheic"), Some("image/heic"));
        assert_eq!(sniff_mime(b"plain text"), None);
    }

    #[test]
    fn prepare_decompresses_and_picks_kind() {
        let req = prepare("foodrecipe", &gzip(JPEG)).unwrap();
        assert_eq!(req.kind, ContentKind::FoodRecipe);
        let image = req.image.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(&image.data[..], JPEG);
    }

    #[test]
    fn prepare_rejects_bad_input() {
        let field = |r: Result<GenerationRequest, AppError>| match r {
            Err(AppError::Validation { field, .. }) => field,
            _ => panic!("expected validation error"),
        };
        assert_eq!(field(prepare("horoscope", &gzip(JPEG))), "keyword");
        assert_eq!(field(prepare("foodid", JPEG)), "image");
        assert_eq!(field(prepare("foodid", &gzip(b"not an image"))), "image");
    }
}
