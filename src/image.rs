use miette::Result;

use crate::error;
use crate::state::MachineState;
use crate::word::{parse_signed_bits, parse_word};

/// A program in the plain-text load format.
///
/// The first line holds the start address, every following line one word, each written as
/// binary digits with the most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadImage {
    orig: u16,
    words: Vec<u16>,
}

impl LoadImage {
    pub fn new(orig: u16, words: Vec<u16>) -> Self {
        LoadImage { orig, words }
    }

    pub fn parse(src: &str) -> Result<LoadImage> {
        let mut lines = Lines::new(src).filter(|(_, text)| !text.is_empty());

        let Some((span, text)) = lines.next() else {
            return Err(error::image_empty());
        };
        // Shorter address lines are sign-extended from their leading digit
        let orig = parse_signed_bits(text)
            .map_err(|e| error::image_bad_orig(span, src, e))?;

        let mut words = Vec::new();
        for (span, text) in lines {
            let word = parse_word(text).map_err(|e| error::image_bad_word(span, src, e))?;
            words.push(word);
        }
        Ok(LoadImage { orig, words })
    }

    /// Address of the first word, and the initial program counter.
    pub fn orig(&self) -> u16 {
        self.orig
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Place every word at consecutive addresses from `orig` (wrapping), and point the program
    /// counter at `orig`.
    pub fn load(&self, state: &mut MachineState) {
        for (i, word) in self.words.iter().enumerate() {
            state.set_mem(self.orig.wrapping_add(i as u16), *word);
        }
        state.set_pc(self.orig);
    }
}

/// Trimmed lines of source, with their byte range.
struct Lines<'a> {
    src: &'a str,
    offs: usize,
}

impl<'a> Lines<'a> {
    fn new(src: &'a str) -> Self {
        Lines { src, offs: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (std::ops::Range<usize>, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.offs >= self.src.len() {
            return None;
        }
        let rest = &self.src[self.offs..];
        let line_len = rest.find('\n').unwrap_or(rest.len());
        let line = &rest[..line_len];

        let trimmed = line.trim_start();
        let start = self.offs + (line.len() - trimmed.len());
        let trimmed = trimmed.trim_end();

        self.offs += line_len + 1;
        Some((start..start + trimmed.len(), trimmed))
    }
}
