//! Source Writer
//!
//! Accumulates generated source text line by line, applying the current
//! indentation. Brace blocks are expressed as closures so the open and close
//! braces can never get out of balance.

/// Configuration for source emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitConfig {
    /// Spaces per indentation level. Zero selects a single tab per level.
    pub indent_size: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self { indent_size: 4 }
    }
}

impl EmitConfig {
    /// The text emitted per indentation level.
    fn indent_unit(self) -> String {
        if self.indent_size == 0 {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_size)
        }
    }
}

/// Indentation-aware text accumulator.
///
/// Content passed to [`SourceWriter::line`] may span multiple lines; each
/// line is prefixed with the current indentation. Blank lines stay truly
/// blank so artifacts carry no trailing whitespace.
pub struct SourceWriter {
    buffer: String,
    indent_unit: String,
    level: usize,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceWriter {
    /// Create a writer with the default four-space indentation.
    pub fn new() -> Self {
        Self::with_config(EmitConfig::default())
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(config: EmitConfig) -> Self {
        Self {
            buffer: String::new(),
            indent_unit: config.indent_unit(),
            level: 0,
        }
    }

    /// Current indentation level.
    #[inline]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Write one logical line (or several, when `content` contains
    /// newlines), each at the current indentation.
    pub fn line(&mut self, content: &str) {
        for line in content.trim_start().split('\n') {
            if line.is_empty() {
                self.buffer.push('\n');
                continue;
            }
            for _ in 0..self.level {
                self.buffer.push_str(&self.indent_unit);
            }
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
    }

    /// Write a blank line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Write an opening brace, run `body` one level deeper, then close the
    /// brace.
    pub fn block(&mut self, body: impl FnOnce(&mut Self)) {
        self.line("{");
        self.level += 1;
        body(self);
        self.level -= 1;
        self.line("}");
    }

    /// Write `using` directives followed by a separating blank line.
    pub fn usings(&mut self, namespaces: &[&str]) {
        if namespaces.is_empty() {
            return;
        }
        for ns in namespaces {
            self.line(&format!("using {ns};"));
        }
        self.blank();
    }

    /// Splice in text already produced by another writer, re-indenting every
    /// non-blank line at the current level.
    pub fn splice(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.buffer.push('\n');
                continue;
            }
            for _ in 0..self.level {
                self.buffer.push_str(&self.indent_unit);
            }
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
    }

    /// Consume the writer and return the accumulated text, guaranteed to end
    /// with exactly one trailing newline.
    pub fn finish(mut self) -> String {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }

    /// The accumulated text so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}
