/// A trimmed source line with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

/// Forward-only cursor over the lines of a text source.
#[derive(Debug, Clone)]
pub struct LineCursor {
    lines: Vec<Line>,
    pos: usize,
}

impl LineCursor {
    pub fn from_raw(raw: &str) -> Self {
        let lines = raw
            .replace("\r\n", "\n")
            .split('\n')
            .enumerate()
            .map(|(i, l)| Line {
                number: i + 1,
                text: l.trim().to_string(),
            })
            .collect();
        LineCursor { lines, pos: 0 }
    }

    pub fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    pub fn next_line(&mut self) -> Option<Line> {
        let line = self.lines.get(self.pos).cloned()?;
        self.pos += 1;
        Some(line)
    }

    /// Skip ahead to the first line matching `f` and take it.
    /// Stops early (without consuming) at a line matching `stop`.
    pub fn take_first_matching<F, S>(&mut self, f: F, stop: S) -> Option<Line>
    where
        F: Fn(&str) -> bool,
        S: Fn(&str) -> bool,
    {
        while let Some(line) = self.peek() {
            if f(&line.text) {
                return self.next_line();
            }
            if stop(&line.text) {
                return None;
            }
            self.pos += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_lines_and_trims() {
        let mut cur = LineCursor::from_raw("  first \r\n\nthird");
        let l = cur.next_line().unwrap();
        assert_eq!((l.number, l.text.as_str()), (1, "first"));
        assert_eq!(cur.next_line().unwrap().text, "");
        assert_eq!(cur.next_line().unwrap().number, 3);
        assert!(cur.next_line().is_none());
    }

    #[test]
    fn take_first_matching_skips_and_stops() {
        let mut cur = LineCursor::from_raw("q1\nnoise\nAnswer: a\nq2\nq3");
        cur.next_line();
        let ans = cur.take_first_matching(|l| l.starts_with("Answer:"), |_| false).unwrap();
        assert_eq!(ans.number, 3);

        let none = cur.take_first_matching(|l| l.starts_with("Answer:"), |l| l == "q3");
        assert!(none.is_none());
        assert_eq!(cur.peek().unwrap().text, "q3");
    }
}
