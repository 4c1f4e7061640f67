//! Splitting a Windows command line into arguments
//!
//! Follows the rules `CommandLineToArgvW` and the MSVC runtime apply, which
//! is how the target itself will have seen its arguments.

/// Splits `command_line` into its arguments.
///
/// The program name is read first: quotes only toggle quoting and
/// backslashes are literal. For every later argument `2n` backslashes before
/// a quote give `n` backslashes and toggle quoting, `2n + 1` give `n`
/// backslashes and a literal quote, and `""` inside quotes is a literal quote.
pub fn split_command_line(command_line: &str) -> Vec<String> {
    let mut args = Vec::new();
    if command_line.is_empty() {
        return args;
    }

    let mut chars = command_line.chars().peekable();

    let mut program = String::new();
    let mut in_quotes = false;
    for c in chars.by_ref() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' | '\t' if !in_quotes => break,
            c => program.push(c),
        }
    }
    args.push(program);

    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut backslashes = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                backslashes += 1;
                in_arg = true;
            }
            '"' => {
                current.extend(std::iter::repeat('\\').take(backslashes / 2));
                if backslashes % 2 == 1 {
                    current.push('"');
                } else if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
                backslashes = 0;
                in_arg = true;
            }
            ' ' | '\t' if !in_quotes => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.extend(std::iter::repeat('\\').take(backslashes));
                backslashes = 0;
                current.push(c);
                in_arg = true;
            }
        }
    }

    current.extend(std::iter::repeat('\\').take(backslashes));
    if in_arg {
        args.push(current);
    }
    args
}
