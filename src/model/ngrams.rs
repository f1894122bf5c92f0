//! Typed `NGram` record and its raw→public conversion (§4.8, §3.1).

use serde::{Deserialize, Serialize};

use crate::model::raw::RawNGram;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NGram {
    pub date: String,
    pub url: String,
    pub lang: String,
    pub position: u8,
    pub pre: String,
    pub ngram: String,
    pub post: String,
}

impl NGram {
    pub fn from_raw(raw: &RawNGram) -> Self {
        NGram {
            date: raw.date.clone(),
            url: raw.url.clone(),
            lang: raw.lang.clone(),
            position: raw.pos.trim().parse().unwrap_or(0),
            pre: raw.pre.clone(),
            ngram: raw.ngram.clone(),
            post: raw.post.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_parses_decile_position() {
        let raw = RawNGram {
            pos: "40".to_string(),
            ..Default::default()
        };
        assert_eq!(NGram::from_raw(&raw).position, 40);
    }

    #[test]
    fn from_raw_defaults_invalid_position_to_zero() {
        let raw = RawNGram {
            pos: "oops".to_string(),
            ..Default::default()
        };
        assert_eq!(NGram::from_raw(&raw).position, 0);
    }
}
