//! Line-level heuristics for Java-like sources. These never parse; they
//! only recognise the shapes the collectors need.

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "abstract",
    "final",
    "static",
    "sealed",
    "non-sealed",
    "strictfp",
];

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "record"];

/// Whether `line` opens a top-level type declaration.
#[must_use]
pub fn is_type_declaration(line: &str) -> bool {
    let mut words = line.split_whitespace().peekable();
    while let Some(word) = words.peek() {
        if MODIFIERS.contains(word) {
            words.next();
        } else {
            break;
        }
    }
    match words.next() {
        Some(word) if word.starts_with("@interface") => true,
        Some(word) => TYPE_KEYWORDS.contains(&word) && words.next().is_some(),
        None => false,
    }
}

/// Whether `line` declares an interface.
#[must_use]
pub fn is_interface_declaration(line: &str) -> bool {
    is_type_declaration(line)
        && line
            .split_whitespace()
            .any(|w| w == "interface" || w.starts_with("@interface"))
}

/// Simple name of the type following `extends`, without generics.
#[must_use]
pub fn extended_type(line: &str) -> Option<&str> {
    let mut words = line.split_whitespace();
    words.find(|w| *w == "extends")?;
    let raw = words.next()?;
    let end = raw
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
        .unwrap_or(raw.len());
    let qualified = &raw[..end];
    let simple = qualified.rsplit('.').next().unwrap_or(qualified);
    (!simple.is_empty()).then_some(simple)
}

/// Net change in brace depth on `line`, ignoring braces inside string or
/// character literals and after a `//` comment.
#[must_use]
pub fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';
    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '/' if prev == '/' => break,
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
        prev = c;
    }
    delta
}

/// Line with leading whitespace removed, or `None` for comment-only lines.
#[must_use]
pub fn code_of(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;
