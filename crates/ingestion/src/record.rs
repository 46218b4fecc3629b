//! Delimited record splitting with quoted fields

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Split one line into trimmed fields
///
/// Quoted fields may contain the delimiter; `""` inside quotes is a literal quote.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                current.push(QUOTE);
                chars.next();
            }
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Pad a record with empty fields up to `width`
pub fn pad_record(mut fields: Vec<String>, width: usize) -> Vec<String> {
    if fields.len() < width {
        fields.resize(width, String::new());
    }
    fields
}

/// Non-blank lines with trailing `\r` removed
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields_are_trimmed() {
        assert_eq!(split_record(" 1 , hip,0.5 ,0.25"), vec!["1", "hip", "0.5", "0.25"]);
    }

    #[test]
    fn test_quoted_delimiter_and_escaped_quote() {
        let fields = split_record(r#"3,"left, ""outer"" hip",10,20"#);
        assert_eq!(fields, vec!["3", r#"left, "outer" hip"#, "10", "20"]);
    }

    #[test]
    fn test_trailing_empty_field_kept() {
        assert_eq!(split_record("1,hip,"), vec!["1", "hip", ""]);
    }

    #[test]
    fn test_pad_short_record() {
        let padded = pad_record(split_record("1,hip"), 4);
        assert_eq!(padded, vec!["1", "hip", "", ""]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = "a,b\r\n\r\n1,2\n   \n3,4";
        let collected: Vec<&str> = lines(text).collect();
        assert_eq!(collected, vec!["a,b", "1,2", "3,4"]);
    }
}
