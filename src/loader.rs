use std::fs;
use std::path::Path;

use miette::{IntoDiagnostic, Result};

use crate::error;
use crate::memory::MEMORY_SIZE;

/// Read a program image from disk.
///
/// `.ls8` files are text, one binary byte per line with `#` comments. Anything else is a raw
/// image copied to memory as-is.
pub fn load_file(path: &Path) -> Result<Vec<u8>> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("ls8") {
        let src = fs::read_to_string(path).into_diagnostic()?;
        return parse_text(&src);
    }
    let image = fs::read(path).into_diagnostic()?;
    if image.len() > MEMORY_SIZE {
        return Err(error::load_binary_too_large(image.len()));
    }
    Ok(image)
}

/// Parse the text form of a program.
///
/// ```text
/// # Print the number 8
/// 10011001 # LDI R0,8
/// 00000000
/// 00001000
/// ```
pub fn parse_text(src: &str) -> Result<Vec<u8>> {
    let mut program = Vec::new();
    let mut offset = 0;

    for line in src.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let code = match line.find('#') {
            Some(comment) => &line[..comment],
            None => line,
        };
        let trimmed = code.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Span of the trimmed token within the whole source
        let start = line_start + (code.len() - code.trim_start().len());
        let span = (start, trimmed.len());

        let byte = parse_byte(trimmed).ok_or_else(|| error::load_bad_byte(span, src))?;
        if program.len() == MEMORY_SIZE {
            let len = src
                .lines()
                .filter(|line| !line.split('#').next().unwrap_or("").trim().is_empty())
                .count();
            return Err(error::load_too_large(span, src, len));
        }
        program.push(byte);
    }

    Ok(program)
}

fn parse_byte(digits: &str) -> Option<u8> {
    if digits.len() > 8 || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(digits, 2).ok()
}

#[cfg(test)]
mod tests {
    use miette::Diagnostic;

    use super::*;

    #[test]
    fn parses_program_text() {
        let src = "\
# print8.ls8
10011001 # LDI R0,8
00000000
00001000

01000111 # PRN R0
00000000
00000001 # HLT
";
        assert_eq!(
            parse_text(src).unwrap(),
            [0b10011001, 0, 8, 0b01000111, 0, 1]
        );
    }

    #[test]
    fn short_bytes_and_crlf() {
        assert_eq!(parse_text("1\r\n  101  \r\n").unwrap(), [1, 5]);
        assert_eq!(parse_text("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_bad_bytes() {
        assert!(parse_text("10011001\n1002\n").is_err());
        assert!(parse_text("100110011\n").is_err());
        assert!(parse_text("LDI\n").is_err());

        let report = parse_text("0\n  12 # bad\n").unwrap_err();
        let labels: Vec<_> = report.labels().unwrap().collect();
        assert_eq!(labels[0].offset(), 4);
        assert_eq!(labels[0].len(), 2);
    }

    #[test]
    fn rejects_oversized_program() {
        let src = "0\n".repeat(MEMORY_SIZE);
        assert_eq!(parse_text(&src).unwrap().len(), MEMORY_SIZE);

        let src = "0\n".repeat(MEMORY_SIZE + 1);
        let report = parse_text(&src).unwrap_err();
        assert!(report.to_string().contains("257 bytes"));
    }

    #[test]
    fn parse_byte_limits() {
        assert_eq!(parse_byte("11111111"), Some(255));
        assert_eq!(parse_byte("0"), Some(0));
        assert_eq!(parse_byte("+1"), None);
    }
}
