//! Log sanitization helpers.
//!
//! Player names and raw action tokens come straight from user input and get
//! logged verbatim; this keeps those log lines single-line and free of
//! terminal control sequences.

/// Cap on how much of a user string one log line carries.
const MAX_PREVIEW: usize = 120;

/// Escape a user-supplied string for single-line logging. Newlines, tabs and
/// backslashes become their escape sequences, other control characters become
/// `\xNN`, and anything past [`MAX_PREVIEW`] characters is dropped with an
/// ellipsis.
pub fn escape_log(s: &str) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
