use keyspan::BufferOps;
use ropey::Rope;

pub struct MockBuffer {
    rope: Rope,
    shiftwidth: usize,
    tabstop: usize,
    expandtab: bool,
}

impl MockBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            shiftwidth: 4,
            tabstop: 8,
            expandtab: true,
        }
    }

    pub fn with_indent(text: &str, shiftwidth: usize, expandtab: bool) -> Self {
        Self {
            rope: Rope::from_str(text),
            shiftwidth,
            tabstop: 8,
            expandtab,
        }
    }

    /// Full buffer text, for assertions.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

impl BufferOps for MockBuffer {
    fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        // A trailing newline makes ropey report one extra, empty line.
        if self.rope.len_chars() > 0 && self.rope.char(self.rope.len_chars() - 1) == '\n' {
            lines - 1
        } else {
            lines
        }
    }

    fn line(&self, line: usize) -> Option<String> {
        if line == 0 || line > self.line_count() {
            return None;
        }
        let mut s = self.rope.line(line - 1).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    fn set_lines(&mut self, first: usize, last: usize, lines: &[String]) {
        let count = self.line_count();
        let first = first.clamp(1, count.max(1));
        let last = last.clamp(first, count.max(1));

        let start = self.rope.line_to_char(first - 1);
        let (end, keeps_tail) = if last >= count {
            (self.rope.len_chars(), false)
        } else {
            // Start of the line after `last`; includes its newline.
            (self.rope.line_to_char(last), true)
        };
        self.rope.remove(start..end);

        if lines.is_empty() {
            if !keeps_tail && start > 0 {
                // Dropped the final lines; the previous line's newline now
                // dangles.
                self.rope.remove(start - 1..start);
            }
            return;
        }
        let mut text = lines.join("\n");
        if keeps_tail {
            text.push('\n');
        }
        self.rope.insert(start, &text);
    }

    fn shiftwidth(&self) -> usize {
        self.shiftwidth
    }

    fn tabstop(&self) -> usize {
        self.tabstop
    }

    fn expandtab(&self) -> bool {
        self.expandtab
    }
}
