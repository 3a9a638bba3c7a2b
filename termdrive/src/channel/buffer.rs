//! Pattern buffer with tail-search optimization.
//!
//! Only the last N bytes of the buffer are searched for prompt patterns,
//! rather than the entire output. For large outputs (e.g., full BGP tables)
//! this is what keeps prompt detection cheap.

use regex::Regex;
use vte::{Parser, Perform};

/// Buffer for accumulating terminal output and searching it for patterns.
///
/// Incoming bytes are run through a VT parser so escape sequences never reach
/// the text; only printable characters and line control survive.
pub struct PatternBuffer {
    /// The accumulated, escape-free output.
    text: String,

    /// VT parser state, kept across chunks so split sequences are handled.
    parser: Parser,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

/// Collects the printable side of the VT stream.
struct TextSink<'a> {
    text: &'a mut String,
}

impl Perform for TextSink<'_> {
    fn print(&mut self, c: char) {
        self.text.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' => self.text.push('\n'),
            b'\t' => self.text.push('\t'),
            // \r\n is the norm on device PTYs; a lone \r is dropped as well
            b'\r' => {}
            // backspace erases the previous character
            0x08 => {
                self.text.pop();
            }
            _ => {}
        }
    }
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    ///
    /// # Arguments
    ///
    /// * `search_depth` - Number of bytes from the end to search for patterns.
    ///   Default recommendation is 1000 bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            text: String::with_capacity(4096),
            parser: Parser::new(),
            search_depth,
        }
    }

    /// Extend the buffer with raw channel data, stripping escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let mut sink = TextSink {
            text: &mut self.text,
        };
        self.parser.advance(&mut sink, data);
    }

    /// Byte offset where the searchable tail begins.
    fn tail_start(&self) -> usize {
        let mut start = self.text.len().saturating_sub(self.search_depth);
        while !self.text.is_char_boundary(start) {
            start += 1;
        }
        start
    }

    /// Search only the tail of the buffer for the pattern.
    ///
    /// Returns the absolute byte offset where the match ends.
    pub fn search_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self.tail_start();
        pattern.find(&self.text[start..]).map(|m| start + m.end())
    }

    /// Remove and return everything up to `end`, keeping the rest buffered.
    pub fn split_to(&mut self, end: usize) -> String {
        let rest = self.text.split_off(end);
        std::mem::replace(&mut self.text, rest)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    /// Get the buffer contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl std::fmt::Debug for PatternBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternBuffer")
            .field("len", &self.text.len())
            .field("search_depth", &self.search_depth)
            .finish()
    }
}
