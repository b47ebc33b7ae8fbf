//! Interactive prompts for the command-line entry point.

use std::io::{self, BufRead, Write};

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask how many records to export and contact. `0` means no limit.
///
/// Blank, non-numeric and negative answers all mean no limit.
pub fn ask_record_count<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<usize> {
    let answer = ask(input, output, "Record count (blank = no limit): ")?;
    Ok(answer
        .parse::<i64>()
        .ok()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0))
}

/// Ask for the agent display name; `None` when left blank.
pub fn ask_agent_name<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<String>> {
    let answer = ask(input, output, "Agent name: ")?;
    Ok(Some(answer).filter(|a| !a.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn count(answer: &str) -> usize {
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let mut output = Vec::new();
        ask_record_count(&mut input, &mut output).unwrap()
    }

    #[test]
    fn test_ask_record_count() {
        assert_eq!(count("25\n"), 25);
        assert_eq!(count("  3 \n"), 3);
        assert_eq!(count("\n"), 0);
        assert_eq!(count(""), 0);
        assert_eq!(count("lots\n"), 0);
        assert_eq!(count("-4\n"), 0);
    }

    #[test]
    fn test_ask_record_count_writes_prompt() {
        let mut input = Cursor::new(b"1\n".to_vec());
        let mut output = Vec::new();
        ask_record_count(&mut input, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Record count (blank = no limit): "
        );
    }

    #[test]
    fn test_ask_agent_name() {
        let mut output = Vec::new();
        let mut input = Cursor::new(b" Silvia \n".to_vec());
        assert_eq!(
            ask_agent_name(&mut input, &mut output).unwrap(),
            Some("Silvia".to_string())
        );

        let mut input = Cursor::new(b"\n".to_vec());
        assert_eq!(ask_agent_name(&mut input, &mut output).unwrap(), None);
    }
}
