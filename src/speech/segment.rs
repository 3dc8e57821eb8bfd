//! Sentence segmentation

use serde::Serialize;

fn is_sentence_terminator(c: char) -> bool {
    c == '.' || c == '?' || c == '!'
}

/// Ordered, immutable list of sentences to narrate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentenceQueue {
    sentences: Vec<String>,
}

impl SentenceQueue {
    /// Split `text` so that every terminator ends one sentence. The
    /// terminator stays with its sentence and leading whitespace is kept.
    /// Text after the last terminator is dropped.
    pub fn split(text: &str) -> Self {
        let mut sentences = Vec::new();
        let mut start = 0;
        for (index, c) in text.char_indices() {
            if is_sentence_terminator(c) {
                let end = index + c.len_utf8();
                sentences.push(text[start..end].to_string());
                start = end;
            }
        }
        Self { sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sentences.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_sentences_keep_leading_space() {
        let queue = SentenceQueue::split("Hello world. This is a test!");
        let sentences: Vec<&str> = queue.iter().collect();
        assert_eq!(sentences, vec!["Hello world.", " This is a test!"]);
    }

    #[test]
    fn test_no_terminator_is_empty() {
        assert!(SentenceQueue::split("no punctuation here").is_empty());
        assert!(SentenceQueue::split("").is_empty());
    }

    #[test]
    fn test_one_sentence_per_terminator() {
        let text = "Really?! Yes... ok. trailing words";
        let terminators = text.chars().filter(|c| is_sentence_terminator(*c)).count();
        let queue = SentenceQueue::split(text);
        assert_eq!(queue.len(), terminators);
        assert_eq!(queue.get(0), Some("Really?"));
        assert_eq!(queue.get(1), Some("!"));
        assert_eq!(queue.get(5), Some(" ok."));
    }

    #[test]
    fn test_multibyte_text() {
        let queue = SentenceQueue::split("Ça va? Très bien.");
        assert_eq!(queue.get(0), Some("Ça va?"));
        assert_eq!(queue.get(1), Some(" Très bien."));
    }
}
