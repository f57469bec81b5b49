//! Line cursor over an immutable request buffer.
//!
//! Lines end at `\n`; one `\r` right before it is dropped. The final line may
//! lack a terminator. Lines are plain slices into the caller's buffer, nothing
//! is copied or written.

/// A single input line with its 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub(crate) number: usize,
    pub(crate) bytes: &'a [u8],
}

impl Line<'_> {
    /// An empty line, or one that held nothing but `\r`.
    pub(crate) fn is_blank(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct Lines<'a> {
    src: &'a [u8],
    pos: usize,
    number: usize,
}

impl<'a> Lines<'a> {
    pub(crate) fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0, number: 0 }
    }

    /// Number of lines handed out so far.
    pub(crate) fn consumed(&self) -> usize {
        self.number
    }

    /// Everything after the last line handed out.
    pub(crate) fn remainder(&self) -> &'a [u8] {
        &self.src[self.pos..]
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.src.len() {
            return None;
        }

        let rest = &self.src[self.pos..];
        let (end, advance) = match rest.iter().position(|b| *b == b'\n') {
            Some(index) => (index, index + 1),
            None => (rest.len(), rest.len()),
        };

        let mut bytes = &rest[..end];
        if let [head @ .., b'\r'] = bytes {
            bytes = head;
        }

        self.pos += advance;
        self.number += 1;

        Some(Line { number: self.number, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(src: &[u8]) -> Vec<&[u8]> {
        Lines::new(src).map(|line| line.bytes).collect()
    }

    #[test]
    fn splits_lf_and_crlf() {
        assert_eq!(collect(b"a\nb\r\nc"), vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
    }

    #[test]
    fn blank_lines() {
        let lines: Vec<_> = Lines::new(b"x\n\n\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(!lines[0].is_blank());
        assert!(lines[1].is_blank());
        assert!(lines[2].is_blank());
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn only_one_carriage_return_is_dropped() {
        assert_eq!(collect(b"a\r\r\n"), vec![&b"a\r"[..]]);
    }

    #[test]
    fn remainder_after_lines() {
        let mut lines = Lines::new(b"head\n\r\nbody\nmore");
        lines.next();
        lines.next();
        assert_eq!(lines.consumed(), 2);
        assert_eq!(lines.remainder(), b"body\nmore");
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(Lines::new(b"").next().is_none());
    }
}
