/// Split a command line into words, honoring single and double quotes.
///
/// Never fails. Backslashes are literal, an
/// unterminated quote runs to the end of the line, and the other quote
/// character is literal inside an active quote. Quote characters are
/// dropped, so adjacent quoted and bare segments join into one word.
/// Emitted words are trimmed and never empty. A byte-order mark (U+FEFF)
/// separates words like any other whitespace.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => buf.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if is_blank(c) => flush(&mut buf, &mut tokens),
            None => buf.push(c),
        }
    }
    flush(&mut buf, &mut tokens);

    tokens
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// Emit the buffer as a trimmed word unless it is blank, then reset it.
fn flush(buf: &mut String, tokens: &mut Vec<String>) {
    let word = buf.trim_matches(is_blank);
    if !word.is_empty() {
        tokens.push(word.to_string());
    }
    buf.clear();
}
