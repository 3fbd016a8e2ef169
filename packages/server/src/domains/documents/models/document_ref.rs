//! Document references and media-type resolution.
//!
//! A document arrives either inline as `data:<media-type>;base64,<bytes>` or as an
//! `http(s)://` URL. Inline references carry their own media type; URL references
//! need the caller to supply one.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentRefError {
    #[error("Document data URI is required")]
    Missing,

    #[error("contentType is required for URL-based documents")]
    MissingContentType,

    #[error("Invalid documentDataUri format: Missing or invalid MIME type.")]
    Unrecognized,
}

/// A parsed document reference, borrowing from the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRef<'a> {
    Inline { media_type: &'a str, data: &'a str },
    Remote { url: &'a str },
}

impl<'a> DocumentRef<'a> {
    pub fn parse(reference: &'a str) -> Result<Self, DocumentRefError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DocumentRefError::Missing);
        }

        if let Some(rest) = reference.strip_prefix("data:") {
            let (media_type, data) = rest
                .split_once(";base64,")
                .ok_or(DocumentRefError::Unrecognized)?;
            if media_type.is_empty() || !media_type.chars().all(is_media_type_char) {
                return Err(DocumentRefError::Unrecognized);
            }
            return Ok(DocumentRef::Inline { media_type, data });
        }

        if is_remote_url(reference) {
            return Ok(DocumentRef::Remote { url: reference });
        }

        Err(DocumentRefError::Unrecognized)
    }

    /// Effective media type. Inline references ignore `content_type`.
    pub fn media_type(&self, content_type: Option<&str>) -> Result<String, DocumentRefError> {
        match self {
            DocumentRef::Inline { media_type, .. } => Ok((*media_type).to_string()),
            DocumentRef::Remote { .. } => content_type
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .map(str::to_string)
                .ok_or(DocumentRefError::MissingContentType),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DocumentRef::Remote { .. })
    }
}

/// Parse `reference` and resolve its media type in one step.
pub fn resolve_media_type(
    reference: &str,
    content_type: Option<&str>,
) -> Result<String, DocumentRefError> {
    DocumentRef::parse(reference)?.media_type(content_type)
}

fn is_media_type_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '+')
}

fn is_remote_url(reference: &str) -> bool {
    let lower = reference
        .get(..8)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn inline_reference_yields_prefix_type() {
        let parsed = DocumentRef::parse("data:application/pdf;base64,AAAA").unwrap();
        assert_eq!(
            parsed,
            DocumentRef::Inline {
                media_type: "application/pdf",
                data: "AAAA"
            }
        );
        assert_eq!(parsed.media_type(None).unwrap(), "application/pdf");
    }

    #[test]
    fn inline_reference_ignores_supplied_content_type() {
        let media_type =
            resolve_media_type("data:image/png;base64,iVBORw0K", Some("application/pdf")).unwrap();
        assert_eq!(media_type, "image/png");
    }

    #[test]
    fn remote_reference_requires_content_type() {
        assert_eq!(
            resolve_media_type("https://example.com/doc.pdf", None),
            Err(DocumentRefError::MissingContentType)
        );
        assert_eq!(
            resolve_media_type("https://example.com/doc.pdf", Some("  ")),
            Err(DocumentRefError::MissingContentType)
        );
        assert_eq!(
            resolve_media_type("http://example.com/doc.pdf", Some("application/pdf")).unwrap(),
            "application/pdf"
        );
    }

    #[test]
    fn remote_scheme_is_case_insensitive() {
        assert!(DocumentRef::parse("HTTPS://EXAMPLE.COM/a.png").unwrap().is_remote());
    }

    #[test]
    fn empty_reference_is_missing() {
        assert_eq!(DocumentRef::parse(""), Err(DocumentRefError::Missing));
        assert_eq!(DocumentRef::parse("   "), Err(DocumentRefError::Missing));
    }

    #[test]
    fn other_shapes_are_rejected() {
        for reference in [
            "ftp://example.com/doc.pdf",
            "/tmp/doc.pdf",
            "data:application/pdf,AAAA",
            "data:;base64,AAAA",
            "data:application/pdf;charset=utf-8;base64,AAAA",
        ] {
            assert_eq!(
                DocumentRef::parse(reference),
                Err(DocumentRefError::Unrecognized),
                "{reference} should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn inline_media_type_roundtrips(
            media_type in "[a-z]{1,12}/[a-z0-9][a-z0-9.+-]{0,24}",
            data in "[A-Za-z0-9+/]{0,64}={0,2}",
        ) {
            let reference = format!("data:{};base64,{}", media_type, data);
            prop_assert_eq!(resolve_media_type(&reference, None).unwrap(), media_type);
        }

        #[test]
        fn remote_without_type_is_always_rejected(path in "[a-z0-9/._-]{0,40}") {
            let reference = format!("https://example.com/{}", path);
            prop_assert_eq!(
                resolve_media_type(&reference, None),
                Err(DocumentRefError::MissingContentType)
            );
        }
    }
}
