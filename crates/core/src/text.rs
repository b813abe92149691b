/// Trims every line, drops the ones left empty, and rejoins with `\n`.
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(text: &str) -> String {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn trims_lines_and_drops_blank_ones() {
        assert_eq!(normalize("  a \n\n b\n  "), "a\nb");
    }

    #[test]
    fn handles_crlf_and_tabs() {
        assert_eq!(normalize("\tfirst line\r\n\r\n  second  line \r\n"), "first line\nsecond  line");
    }

    #[test]
    fn blank_input_becomes_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t\n   "), "");
    }

    #[test]
    fn is_idempotent_and_keeps_line_order() {
        let samples = [
            "",
            "single",
            "  leading\ntrailing  ",
            "**Pizza**\n\n  - Margherita\n  - Veggie Supreme\n\n",
            "c\n b\n  a",
            "\n\n\nx\n\n\n",
        ];

        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "normalize should be idempotent for {sample:?}");

            let expected = sample
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>();
            let actual = if once.is_empty() { Vec::new() } else { once.split('\n').collect() };
            assert_eq!(actual, expected, "line order should be preserved for {sample:?}");
        }
    }
}
