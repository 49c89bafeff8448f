//! Removal of shared leading whitespace from extracted code blocks.

/// Strip the widest leading-whitespace prefix shared by every non-blank
/// line, preserving relative indentation. Blank lines are stripped by the
/// same character count even when they are shorter. Text with no non-blank
/// lines is returned unchanged. Idempotent.
pub fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let width = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min();

    let Some(width) = width else {
        return text.to_string();
    };

    lines
        .iter()
        .map(|line| line.chars().skip(width).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::unindent;

    #[test]
    fn removes_uniform_indentation() {
        let text = "    def foo():\n        pass";
        assert_eq!(unindent(text), "def foo():\n    pass");
    }

    #[test]
    fn minimum_wins_across_lines() {
        let text = "        body\n    header\n        body";
        assert_eq!(unindent(text), "    body\nheader\n    body");
    }

    #[test]
    fn zero_indent_line_means_no_change() {
        let text = "header\n    body";
        assert_eq!(unindent(text), text);
    }

    #[test]
    fn blank_lines_do_not_count_but_are_stripped() {
        let text = "    a\n\n    b";
        assert_eq!(unindent(text), "a\n\nb");
    }

    #[test]
    fn short_blank_lines_survive_the_strip() {
        let text = "        a\n  \n        b";
        assert_eq!(unindent(text), "a\n\nb");
    }

    #[test]
    fn all_blank_text_is_unchanged() {
        assert_eq!(unindent("  \n   \n"), "  \n   \n");
        assert_eq!(unindent(""), "");
    }

    #[test]
    fn idempotent() {
        let texts = [
            "    def foo():\n        pass",
            "header\n    body",
            "  \n   ",
            "",
            "        a\n\n    b\n            c",
        ];
        for text in texts {
            let once = unindent(text);
            assert_eq!(unindent(&once), once);
        }
    }
}
