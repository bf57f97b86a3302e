//! Interactive prompt for the source root.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::errors::AppError;

const PROMPT: &str = "Java source root: ";

/// Asks for the source root on `stderr` and reads one line from `stdin`.
///
/// Surrounding whitespace is dropped. End of input or a blank line yields
/// [`AppError::MissingRoot`].
pub(crate) fn read_root<R, E>(stdin: &mut R, stderr: &mut E) -> Result<PathBuf, AppError>
where
    R: BufRead,
    E: Write,
{
    write!(stderr, "{PROMPT}").map_err(AppError::Prompt)?;
    stderr.flush().map_err(AppError::Prompt)?;

    let mut line = String::new();
    stdin.read_line(&mut line).map_err(AppError::Prompt)?;
    let root = line.trim();
    if root.is_empty() {
        return Err(AppError::MissingRoot);
    }
    Ok(PathBuf::from(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case("src/main/java\n", "src/main/java")]
    #[case("  /work/app/src \r\n", "/work/app/src")]
    #[case("no-newline", "no-newline")]
    fn reads_one_trimmed_line(#[case] input: &str, #[case] expected: &str) {
        let mut stdin = Cursor::new(input.as_bytes());
        let mut stderr = Vec::new();

        let root = read_root(&mut stdin, &mut stderr).expect("root");

        assert_eq!(root, PathBuf::from(expected));
        assert_eq!(String::from_utf8(stderr).expect("utf8"), PROMPT);
    }

    #[rstest]
    #[case("")]
    #[case("\n")]
    #[case("   \n")]
    fn blank_input_is_missing_root(#[case] input: &str) {
        let mut stdin = Cursor::new(input.as_bytes());
        let mut stderr = Vec::new();

        let result = read_root(&mut stdin, &mut stderr);

        assert!(matches!(result, Err(AppError::MissingRoot)));
    }

    #[test]
    fn only_the_first_line_is_consumed() {
        let mut stdin = Cursor::new(b"first\nsecond\n".as_slice());
        let mut stderr = Vec::new();

        let root = read_root(&mut stdin, &mut stderr).expect("root");

        assert_eq!(root, PathBuf::from("first"));
        let mut rest = String::new();
        stdin.read_line(&mut rest).expect("rest");
        assert_eq!(rest, "second\n");
    }
}
