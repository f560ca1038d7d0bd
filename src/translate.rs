//! Request validation and translation into upstream input.
//!
//! `contents` blocks are flattened into one ordered list of [`InputItem`]s.
//! Inline image parts are base64-decoded (and optionally decoded as images)
//! before anything is sent upstream; a single bad part fails the whole request.

use crate::ai::mime::resolve_mime;
use crate::ai::InputItem;
use crate::config::ImageDecoding;
use crate::models::{ChatRequest, GenerationRequest, InlineDataPart, RequestPart};
use crate::{Error, Result};
use base64::Engine as _;

pub const MISSING_MESSAGE: &str = "메시지를 입력해주세요";
pub const MISSING_PAYLOAD: &str = "payload가 필요합니다";
pub const EMPTY_CONTENTS: &str = "contents가 비어있습니다";
pub const AMBIGUOUS_PART: &str = "각 part에는 text 또는 inlineData 중 하나만 있어야 합니다";

/// Extract the chat message, rejecting missing or empty values.
pub fn chat_message(request: ChatRequest) -> Result<String> {
    match request.message {
        Some(message) if !message.is_empty() => Ok(message),
        _ => Err(Error::Validation(MISSING_MESSAGE.to_string())),
    }
}

/// Flatten a generation request into upstream input, preserving part order.
pub fn generation_inputs(
    request: GenerationRequest,
    decoding: ImageDecoding,
) -> Result<Vec<InputItem>> {
    let payload = request
        .payload
        .ok_or_else(|| Error::Validation(MISSING_PAYLOAD.to_string()))?;

    if payload.contents.is_empty() {
        return Err(Error::Validation(EMPTY_CONTENTS.to_string()));
    }

    let mut inputs = Vec::new();
    for (block_index, block) in payload.contents.into_iter().enumerate() {
        for (part_index, part) in block.parts.into_iter().enumerate() {
            let item = translate_part(part, decoding).map_err(|e| match e {
                Error::Decode(msg) => Error::Decode(format!(
                    "contents[{}].parts[{}]: {}",
                    block_index, part_index, msg
                )),
                other => other,
            })?;
            inputs.push(item);
        }
    }

    if inputs.is_empty() {
        return Err(Error::Validation(EMPTY_CONTENTS.to_string()));
    }

    Ok(inputs)
}

fn translate_part(part: RequestPart, decoding: ImageDecoding) -> Result<InputItem> {
    match (part.text, part.inline_data) {
        (Some(text), None) => Ok(InputItem::Text(text)),
        (None, Some(inline)) => decode_inline(&inline, decoding),
        _ => Err(Error::Validation(AMBIGUOUS_PART.to_string())),
    }
}

/// Decode one inline image part into bytes plus MIME type.
pub fn decode_inline(part: &InlineDataPart, decoding: ImageDecoding) -> Result<InputItem> {
    let (data_url_mime, encoded) = split_data_url(&part.data);
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| Error::Decode(format!("invalid base64 image data: {}", e)))?;

    if bytes.is_empty() {
        return Err(Error::Decode("image data is empty".to_string()));
    }

    let declared = if part.mime_type.trim().is_empty() {
        data_url_mime.unwrap_or_default()
    } else {
        part.mime_type.as_str()
    };

    let mime_type = match decoding {
        ImageDecoding::Raw => resolve_mime(declared, &bytes),
        ImageDecoding::Verify => {
            let decoded = image::load_from_memory(&bytes)?;
            tracing::debug!(
                "Verified inline image ({}x{}, {} bytes)",
                decoded.width(),
                decoded.height(),
                bytes.len()
            );
            match image::guess_format(&bytes) {
                Ok(format) if declared.trim().is_empty() => format.to_mime_type().to_string(),
                _ => resolve_mime(declared, &bytes),
            }
        }
    };

    Ok(InputItem::Image { mime_type, bytes })
}

/// Split `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(data: &str) -> (Option<&str>, &str) {
    let trimmed = data.trim_start();
    let Some(rest) = trimmed.strip_prefix("data:") else {
        return (None, data);
    };

    match rest.split_once(',') {
        Some((header, payload)) if header.ends_with(";base64") => {
            let mime = header.trim_end_matches(";base64");
            ((!mime.is_empty()).then_some(mime), payload)
        }
        _ => (None, data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentBlock, GenerationPayload};
    use image::{DynamicImage, ImageFormat};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn text(t: &str) -> RequestPart {
        RequestPart {
            text: Some(t.to_string()),
            inline_data: None,
        }
    }

    fn inline(mime: &str, data: &str) -> RequestPart {
        RequestPart {
            text: None,
            inline_data: Some(InlineDataPart {
                mime_type: mime.to_string(),
                data: data.to_string(),
            }),
        }
    }

    fn request(blocks: Vec<Vec<RequestPart>>) -> GenerationRequest {
        GenerationRequest {
            payload: Some(GenerationPayload {
                contents: blocks
                    .into_iter()
                    .map(|parts| ContentBlock { parts })
                    .collect(),
            }),
        }
    }

    fn png_base64() -> String {
        let mut buf = Vec::new();
        DynamicImage::new_rgb8(1, 1)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        base64::engine::general_purpose::STANDARD.encode(buf)
    }

    #[test]
    fn test_chat_message_accepts_non_empty() {
        let message = chat_message(ChatRequest {
            message: Some("hello".into()),
        })
        .unwrap();
        assert_eq!(message, "hello");
    }

    #[test]
    fn test_chat_message_rejects_missing_and_empty() {
        for message in [None, Some(String::new())] {
            let err = chat_message(ChatRequest { message }).unwrap_err();
            assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_MESSAGE));
        }
    }

    #[test]
    fn test_text_only_preserves_count_and_order() {
        let inputs = generation_inputs(
            request(vec![vec![text("a"), text("b")], vec![text("c")]]),
            ImageDecoding::Raw,
        )
        .unwrap();

        assert_eq!(
            inputs,
            vec![
                InputItem::Text("a".into()),
                InputItem::Text("b".into()),
                InputItem::Text("c".into()),
            ]
        );
    }

    #[test]
    fn test_mixed_parts_decode_images_in_place() {
        let inputs = generation_inputs(
            request(vec![vec![
                text("before"),
                inline("image/png", "iVBORw=="),
                text("after"),
            ]]),
            ImageDecoding::Raw,
        )
        .unwrap();

        assert_eq!(
            inputs,
            vec![
                InputItem::Text("before".into()),
                InputItem::Image {
                    mime_type: "image/png".into(),
                    bytes: vec![0x89, 0x50, 0x4E, 0x47],
                },
                InputItem::Text("after".into()),
            ]
        );
    }

    #[test]
    fn test_missing_payload_is_validation_error() {
        let err = generation_inputs(GenerationRequest::default(), ImageDecoding::Raw).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_PAYLOAD));
    }

    #[test]
    fn test_empty_contents_is_validation_error() {
        let err = generation_inputs(request(vec![]), ImageDecoding::Raw).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == EMPTY_CONTENTS));
    }

    #[test]
    fn test_contents_without_parts_is_validation_error() {
        let err = generation_inputs(request(vec![vec![], vec![]]), ImageDecoding::Raw).unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == EMPTY_CONTENTS));
    }

    #[test]
    fn test_part_with_both_or_neither_variant_is_rejected() {
        let both = RequestPart {
            text: Some("x".into()),
            inline_data: Some(InlineDataPart {
                mime_type: "image/png".into(),
                data: "iVBORw==".into(),
            }),
        };
        for part in [both, RequestPart::default()] {
            let err = generation_inputs(request(vec![vec![part]]), ImageDecoding::Raw).unwrap_err();
            assert!(matches!(err, Error::Validation(ref msg) if msg == AMBIGUOUS_PART));
        }
    }

    #[test]
    fn test_invalid_base64_aborts_whole_request() {
        let err = generation_inputs(
            request(vec![vec![text("ok"), inline("image/png", "!!!not-base64!!!")]]),
            ImageDecoding::Raw,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Decode(ref msg) if msg.starts_with("contents[0].parts[1]")));
    }

    #[test]
    fn test_empty_image_data_is_decode_error() {
        let err = generation_inputs(request(vec![vec![inline("image/png", "")]]), ImageDecoding::Raw)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_whitespace_in_base64_is_tolerated() {
        let item = decode_inline(
            &InlineDataPart {
                mime_type: "image/png".into(),
                data: "iVBO\nRw==\n".into(),
            },
            ImageDecoding::Raw,
        )
        .unwrap();
        assert!(matches!(item, InputItem::Image { ref bytes, .. } if bytes == &[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_data_url_supplies_missing_mime() {
        let item = decode_inline(
            &InlineDataPart {
                mime_type: String::new(),
                data: "data:image/webp;base64,iVBORw==".into(),
            },
            ImageDecoding::Raw,
        )
        .unwrap();
        assert!(matches!(item, InputItem::Image { ref mime_type, .. } if mime_type == "image/webp"));
    }

    #[test]
    fn test_blank_mime_is_sniffed() {
        let item = decode_inline(
            &InlineDataPart {
                mime_type: String::new(),
                data: "/9j/4A==".into(),
            },
            ImageDecoding::Raw,
        )
        .unwrap();
        assert!(matches!(item, InputItem::Image { ref mime_type, .. } if mime_type == "image/jpeg"));
    }

    #[test]
    fn test_verify_accepts_readable_image() {
        let item = decode_inline(
            &InlineDataPart {
                mime_type: String::new(),
                data: png_base64(),
            },
            ImageDecoding::Verify,
        )
        .unwrap();
        assert!(matches!(item, InputItem::Image { ref mime_type, .. } if mime_type == "image/png"));
    }

    #[test]
    fn test_verify_rejects_unreadable_image() {
        let err = generation_inputs(
            request(vec![vec![inline("image/png", "iVBORw==")]]),
            ImageDecoding::Verify,
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }
}
