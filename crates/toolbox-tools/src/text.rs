//! Size and count statistics for a piece of text.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStats {
    /// UTF-8 length.
    pub bytes: usize,
    pub kilobytes: f64,
    pub megabytes: f64,
    /// Unicode scalar values.
    pub chars: usize,
    pub chars_no_whitespace: usize,
    /// Whitespace-separated tokens of the trimmed text.
    pub words: usize,
    /// `\n`-separated lines of the trimmed text; 0 when blank.
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let bytes = text.len();
        let trimmed = text.trim();
        Self {
            bytes,
            kilobytes: bytes as f64 / 1024.0,
            megabytes: bytes as f64 / (1024.0 * 1024.0),
            chars: text.chars().count(),
            chars_no_whitespace: text.chars().filter(|c| !c.is_whitespace()).count(),
            words: trimmed.split_whitespace().count(),
            lines: if trimmed.is_empty() {
                0
            } else {
                trimmed.split('\n').count()
            },
        }
    }
}

impl fmt::Display for TextStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bytes:                  {}", group_thousands(self.bytes))?;
        writeln!(f, "Kilobytes:              {:.2} KB", self.kilobytes)?;
        writeln!(f, "Megabytes:              {:.4} MB", self.megabytes)?;
        writeln!(f, "Characters:             {}", self.chars)?;
        writeln!(f, "Characters (no spaces): {}", self.chars_no_whitespace)?;
        writeln!(f, "Words:                  {}", self.words)?;
        write!(f, "Lines:                  {}", self.lines)
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(d);
    }
    out
}
