//! Candidate data structure.

/// A single extracted pin proposed for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Stable identifier when derivable from structured data,
    /// pseudo-identifier or random fallback otherwise
    pub id: String,

    /// Absolute image URL, upgraded to the highest known resolution
    pub url: String,

    /// Caption text, possibly empty
    pub description: String,

    /// Sponsored records must never reach the normalizer
    pub is_promoted: bool,
}

impl Candidate {
    /// Key used for per-cycle deduplication: the id when non-empty,
    /// the URL otherwise.
    pub fn dedupe_key(&self) -> &str {
        if self.id.is_empty() {
            &self.url
        } else {
            &self.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candidate() -> Candidate {
        Candidate {
            id: "abc123".to_string(),
            url: "https://i.pinimg.com/originals/ab/cd.jpg".to_string(),
            description: "a pin".to_string(),
            is_promoted: false,
        }
    }

    #[test]
    fn test_dedupe_key_prefers_id() {
        let candidate = sample_candidate();
        assert_eq!(candidate.dedupe_key(), "abc123");
    }

    #[test]
    fn test_dedupe_key_falls_back_to_url() {
        let candidate = Candidate {
            id: String::new(),
            ..sample_candidate()
        };
        assert_eq!(candidate.dedupe_key(), "https://i.pinimg.com/originals/ab/cd.jpg");
    }
}
