// src/preprocess/stopwords.rs
//! Stopword removal.
//!
//! The set is the union of the bundled Indonesian list (the Sastrawi stopword
//! remover's list) and a manually curated list of discourse particles from
//! configuration.

use std::collections::HashSet;

/// Indonesian stopwords bundled with the crate.
pub const LIBRARY_STOPWORDS: &[&str] = &[
    "yang", "untuk", "pada", "ke", "para", "namun", "menurut", "antara", "dia", "dua",
    "ia", "seperti", "jika", "sehingga", "kembali", "dan", "tidak", "ini", "karena",
    "kepada", "oleh", "saat", "harus", "sementara", "setelah", "belum", "kami",
    "sekitar", "bagi", "serta", "di", "dari", "telah", "sebagai", "masih", "hal",
    "ketika", "adalah", "itu", "dalam", "bisa", "bahwa", "atau", "hanya", "kita",
    "dengan", "akan", "juga", "ada", "mereka", "sudah", "saya", "terhadap", "secara",
    "agar", "lain", "anda", "begitu", "mengapa", "kenapa", "yaitu", "yakni",
    "daripada", "itulah", "lagi", "maka", "tentang", "demi", "dimana", "kemana",
    "pula", "sambil", "sebelum", "sesudah", "supaya", "guna", "kah", "pun", "sampai",
    "sedangkan", "selagi", "tetapi", "apakah", "kecuali", "sebab", "selain",
    "seolah", "seraya", "seterusnya", "tanpa", "agak", "boleh", "dapat", "dsb", "dst",
    "dll", "dahulu", "dulunya", "anu", "demikian", "tapi", "ingin", "nggak", "mari",
    "nanti", "melainkan", "oh", "ok", "seharusnya", "sebetulnya", "setiap",
    "setidaknya", "sesuatu", "pasti", "saja", "toh", "ya", "walau", "tolong", "tentu",
    "amat", "apalagi", "bagaimanapun",
];

#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    words: HashSet<String>,
}

impl StopwordFilter {
    /// Build from the bundled list (when `use_library`) plus `manual` entries.
    pub fn new<I, S>(use_library: bool, manual: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = HashSet::new();
        if use_library {
            words.extend(LIBRARY_STOPWORDS.iter().map(|w| w.to_string()));
        }
        for w in manual {
            let w = w.as_ref().trim().to_lowercase();
            if !w.is_empty() {
                words.insert(w);
            }
        }
        Self { words }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn filter(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|w| !self.words.contains(*w))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
