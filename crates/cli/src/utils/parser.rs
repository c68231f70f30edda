/// Split `path:line` into the path and a 0-based line number
pub fn parse_filepath_with_line(filepath_arg: &str) -> (String, Option<usize>) {
    if let Some(colon_pos) = filepath_arg.rfind(':') {
        let path_part = &filepath_arg[..colon_pos];
        let line_part = &filepath_arg[colon_pos + 1..];

        // Check if it's a valid line number
        if let Ok(line_num) = line_part.parse::<usize>() {
            // Convert 1-based to 0-based
            (path_part.to_string(), Some(line_num.saturating_sub(1)))
        } else {
            // Not a valid line number, treat the whole thing as a path
            (filepath_arg.to_string(), None)
        }
    } else {
        (filepath_arg.to_string(), None)
    }
}

/// Split `path:line:column` into the path and a 0-based line and column.
///
/// A missing column means the start of the line.
pub fn parse_filepath_with_position(filepath_arg: &str) -> (String, Option<(usize, usize)>) {
    let (rest, last) = parse_filepath_with_line(filepath_arg);
    let Some(last) = last else {
        return (rest, None);
    };

    match parse_filepath_with_line(&rest) {
        (path, Some(line)) => (path, Some((line, last))),
        (path, None) => (path, Some((last, 0))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filepath_with_line() {
        assert_eq!(
            parse_filepath_with_line("models/User.cfc:12"),
            ("models/User.cfc".to_string(), Some(11))
        );
        assert_eq!(parse_filepath_with_line("models/User.cfc"), ("models/User.cfc".to_string(), None));
        assert_eq!(parse_filepath_with_line("C:dir"), ("C:dir".to_string(), None));
    }

    #[test]
    fn test_parse_filepath_with_position() {
        assert_eq!(
            parse_filepath_with_position("handlers/Main.cfc:3:9"),
            ("handlers/Main.cfc".to_string(), Some((2, 8)))
        );
        assert_eq!(
            parse_filepath_with_position("handlers/Main.cfc:3"),
            ("handlers/Main.cfc".to_string(), Some((2, 0)))
        );
        assert_eq!(
            parse_filepath_with_position("handlers/Main.cfc"),
            ("handlers/Main.cfc".to_string(), None)
        );
    }
}
