// src/preprocess/validity.rs
//! Optional content gate applied to processed text.
//!
//! Rejects very short texts, keyboard mashing (no vowel at all, or one character
//! repeated five or more times in a row) and, when a language detector is
//! injected, texts not in the expected language. Disabled unless the pipeline is
//! asked for it.

use std::sync::Arc;

/// Language identification capability. `None` means detection failed.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}

pub const DEFAULT_MIN_WORDS: usize = 3;
pub const DEFAULT_LANGUAGE: &str = "id";
const MAX_CHAR_RUN: usize = 4;

#[derive(Clone)]
pub struct ContentFilter {
    pub min_words: usize,
    pub language: String,
    detector: Option<Arc<dyn LanguageDetector>>,
}

impl std::fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilter")
            .field("min_words", &self.min_words)
            .field("language", &self.language)
            .field("detector", &self.detector.is_some())
            .finish()
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            language: DEFAULT_LANGUAGE.to_string(),
            detector: None,
        }
    }
}

impl ContentFilter {
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn is_valid(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if text.split_whitespace().count() < self.min_words {
            return false;
        }
        if is_gibberish(text) {
            return false;
        }
        match &self.detector {
            Some(d) => d
                .detect(text)
                .is_some_and(|lang| lang.eq_ignore_ascii_case(&self.language)),
            None => true,
        }
    }
}

/// No vowel anywhere, or any character repeated more than four times in a row.
pub fn is_gibberish(text: &str) -> bool {
    let has_vowel = text
        .chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'i' | 'u' | 'e' | 'o'));
    if !has_vowel {
        return true;
    }

    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
            if run > MAX_CHAR_RUN {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl LanguageDetector for Fixed {
        fn detect(&self, _text: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn gibberish_rules() {
        assert!(is_gibberish("wkwk hhh"));
        assert!(is_gibberish("mantaaaaap sekali"));
        assert!(!is_gibberish("mantaaaap sekali"));
        assert!(!is_gibberish("makan siang gratis"));
    }

    #[test]
    fn short_text_is_rejected() {
        let f = ContentFilter::default();
        assert!(!f.is_valid("enak sekali"));
        assert!(f.is_valid("makan siang enak"));
        assert!(!f.is_valid(""));
    }

    #[test]
    fn language_gate_uses_detector() {
        let id = ContentFilter::default().with_detector(Arc::new(Fixed(Some("id"))));
        let en = ContentFilter::default().with_detector(Arc::new(Fixed(Some("en"))));
        let failed = ContentFilter::default().with_detector(Arc::new(Fixed(None)));
        let text = "makan siang gratis enak";
        assert!(id.is_valid(text));
        assert!(!en.is_valid(text));
        assert!(!failed.is_valid(text));
    }
}
