//! Terminal output sanitization
//!
//! Keys and values read from the key-value store are arbitrary user data (chat
//! messages, pasted terminal output) and may carry ANSI escape sequences. Anything
//! printed by the inspector goes through [`strip_ansi_codes`] first so stored text
//! cannot clear the screen, move the cursor or restyle the terminal.

/// Strips ANSI CSI escape codes and stray control characters from a string
///
/// Tab, newline and carriage return are kept.
///
/// # Examples
///
/// ```
/// use cursor_history_restore::utils::terminal::strip_ansi_codes;
///
/// assert_eq!(strip_ansi_codes("\x1b[31mbubbleId:1\x1b[0m"), "bubbleId:1");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI sequences end with a letter
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}
