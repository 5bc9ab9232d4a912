use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kiosk::CODE_LENGTH;
use crate::model::{
    api::ApiId,
    db::{Candidate, NewCandidate},
};

/// Shown in place of a candidate photo that was never set.
pub const FALLBACK_IMAGE: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";

/// Largest inline (`data:`) photo accepted, in decoded bytes.
pub const MAX_INLINE_IMAGE_BYTES: usize = 3 * 512 * 1024;

const INLINE_IMAGE_PREFIX: &str = "data:image/";

/// A candidate as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub code: String,
    pub image: String,
}

impl CandidateSpec {
    /// Check the submission and turn it into a candidate ready for insertion.
    ///
    /// Names and image references are trimmed; the code must be exactly
    /// [`CODE_LENGTH`] ASCII digits.
    pub fn validate(self) -> Result<NewCandidate> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(bad_request("Candidate name must not be empty"));
        }

        let code = self.code.trim();
        if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad_request(format!(
                "Ballot number must be exactly {CODE_LENGTH} digits, got {code:?}"
            )));
        }

        let image = self.image.trim();
        if image.is_empty() {
            return Err(bad_request("Candidate photo must not be empty"));
        }
        if let Some(size) = inline_image_size(image) {
            if size > MAX_INLINE_IMAGE_BYTES {
                return Err(bad_request(format!(
                    "Candidate photo is too large: {size} bytes (limit {MAX_INLINE_IMAGE_BYTES})"
                )));
            }
        }

        Ok(NewCandidate {
            name: name.to_string(),
            code: code.to_string(),
            image: image.to_string(),
        })
    }
}

/// Approximate decoded size of an inline base64 image, or `None` if the
/// reference is not inline.
fn inline_image_size(image: &str) -> Option<usize> {
    if !image.starts_with(INLINE_IMAGE_PREFIX) {
        return None;
    }
    let payload = image.split_once(',').map(|(_, data)| data).unwrap_or("");
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    Some((payload.len() / 4 * 3).saturating_sub(padding))
}

fn bad_request(msg: impl Into<String>) -> Error {
    Error::Status(Status::BadRequest, msg.into())
}

/// API-friendly description of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDesc {
    pub id: ApiId,
    pub name: String,
    pub code: String,
    pub image: String,
}

impl From<Candidate> for CandidateDesc {
    fn from(candidate: Candidate) -> Self {
        let image = if candidate.image.trim().is_empty() {
            FALLBACK_IMAGE.to_string()
        } else {
            candidate.candidate.image
        };
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            code: candidate.candidate.code,
            image,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, code: &str, image: &str) -> CandidateSpec {
        CandidateSpec {
            name: name.to_string(),
            code: code.to_string(),
            image: image.to_string(),
        }
    }

    #[test]
    fn valid_spec_is_trimmed() {
        let candidate = spec("  Ana Souza ", " 01", " https://example.com/a.png ")
            .validate()
            .unwrap();
        assert_eq!(candidate.name, "Ana Souza");
        assert_eq!(candidate.code, "01");
        assert_eq!(candidate.image, "https://example.com/a.png");
    }

    #[test]
    fn bad_codes_are_rejected() {
        for code in ["", "1", "123", "a1", "1 ", "１２"] {
            let result = spec("Ana", code, "x.png").validate();
            assert!(
                matches!(result, Err(Error::Status(s, _)) if s == Status::BadRequest),
                "accepted code {code:?}"
            );
        }
    }

    #[test]
    fn empty_name_or_image_is_rejected() {
        assert!(spec("   ", "01", "x.png").validate().is_err());
        assert!(spec("Ana", "01", "").validate().is_err());
    }

    #[test]
    fn oversized_inline_image_is_rejected() {
        let small = format!("data:image/png;base64,{}", "A".repeat(1024));
        assert!(spec("Ana", "01", &small).validate().is_ok());

        let big = format!(
            "data:image/png;base64,{}",
            "A".repeat(MAX_INLINE_IMAGE_BYTES / 3 * 4 + 8)
        );
        assert!(spec("Ana", "01", &big).validate().is_err());
    }

    #[test]
    fn missing_image_falls_back() {
        let mut candidate = Candidate::with_fresh_id(NewCandidate::example1());
        candidate.image = String::new();
        let desc = CandidateDesc::from(candidate);
        assert_eq!(desc.image, FALLBACK_IMAGE);
    }
}
