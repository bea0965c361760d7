use ahash::AHashSet;

/// Word tokenizer shared by the text vectorizer and its fitted vocabulary.
///
/// Tokens are runs of alphanumeric characters or `_` at least `min_len`
/// characters long. Stop words are removed before n-grams are formed.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lowercase: bool,
    min_len: usize,
    stop_words: AHashSet<String>,
    ngram_range: (usize, usize),
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lowercase: true,
            min_len: 2,
            stop_words: AHashSet::new(),
            ngram_range: (1, 1),
        }
    }

    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len.max(1);
        self
    }

    #[must_use]
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lowercase = self.lowercase;
        self.stop_words = words
            .into_iter()
            .map(|w| {
                if lowercase {
                    w.as_ref().to_lowercase()
                } else {
                    w.as_ref().to_string()
                }
            })
            .collect();
        self
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| w.chars().count() >= self.min_len)
            .filter(|w| !self.stop_words.contains(*w))
            .collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let words = self.words(&text);

        let (min_n, max_n) = self.ngram_range;
        if min_n == 1 && max_n == 1 {
            return words.into_iter().map(str::to_string).collect();
        }

        let mut tokens = Vec::new();
        for n in min_n..=max_n {
            tokens.extend(words.windows(n).map(|w| w.join(" ")));
        }
        tokens
    }
}
