//! `key:value` annotation grammar
//!
//! ```text
//! text   := ws* (token (ws+ token)*)? ws*
//! token  := key ':' value
//! key    := [^\s:"]+
//! value  := bare | quoted
//! bare   := [^\s"][^\s]*
//! quoted := '"' ( [^"\\] | '\\' ["\\] )* '"'
//! ```
//!
//! Values that are empty or contain whitespace, quotes or backslashes are
//! written quoted. Fragments that are not tokens are skipped on decode.

/// Encode pairs in the given order.
pub fn encode<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key.as_ref());
        out.push(':');
        push_value(&mut out, value.as_ref());
    }
    out
}

fn push_value(out: &mut String, value: &str) {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if !needs_quotes {
        out.push_str(value);
        return;
    }
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
}

/// Decode every well-formed token, in order.
pub fn decode(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            return pairs;
        }

        let mut key = String::new();
        let mut well_formed = false;
        while let Some(&c) = chars.peek() {
            if c == ':' {
                chars.next();
                well_formed = !key.is_empty();
                break;
            }
            if c.is_whitespace() || c == '"' {
                break;
            }
            key.push(c);
            chars.next();
        }

        if !well_formed {
            // skip the rest of this fragment
            while chars.peek().is_some_and(|c| !c.is_whitespace()) {
                chars.next();
            }
            continue;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => value.push(other),
                }
            }
            if !closed {
                return pairs;
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        pairs.push((key, value));
    }
}
