//! Path string utilities.
//!
//! # Responsibilities
//! - Canonicalize request paths before case-insensitive recovery
//! - Compute shared prefixes while splitting tree nodes
//! - Decode percent-encoded parameter values
//!
//! # Design Decisions
//! - Pure functions, no state
//! - Decoding never fails a lookup: malformed input is passed through raw

use std::borrow::Cow;

/// Returns the canonical form of `p`.
///
/// Rules, applied until nothing changes:
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path element.
/// 3. Eliminate each `..` element together with the non-`..` element preceding it.
/// 4. Eliminate `..` elements that begin a rooted path (`/..` becomes `/`).
///
/// The result always starts with `/`. A trailing slash survives when the input
/// had one or ended in a `.` element.
pub fn clean_path(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in p.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let trailing = (p.len() > 1 && p.ends_with('/')) || p.ends_with("/.") || p == ".";

    let mut out = String::with_capacity(p.len() + 1);
    for segment in &segments {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() || trailing {
        out.push('/');
    }
    out
}

/// Length in bytes of the longest common prefix of `a` and `b`.
pub fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Percent-decodes a parameter value, turning `+` into a space.
///
/// Values with a malformed escape (or decoding to invalid UTF-8) are returned
/// unchanged.
pub fn unescape(value: &str) -> Cow<'_, str> {
    if !value.bytes().any(|b| b == b'%' || b == b'+') {
        return Cow::Borrowed(value);
    }
    if !has_valid_escapes(value.as_bytes()) {
        return Cow::Borrowed(value);
    }

    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Borrowed(value),
    }
}

fn has_valid_escapes(mut rest: &[u8]) -> bool {
    while let Some(pos) = rest.iter().position(|&b| b == b'%') {
        match rest.get(pos + 1..pos + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                rest = &rest[pos + 3..];
            }
            _ => return false,
        }
    }
    true
}

/// `/foo/` becomes `/foo` and `/foo` becomes `/foo/`; `/` is left alone.
pub fn toggle_trailing_slash(path: &str) -> String {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        Some(_) => path.to_string(),
        None => format!("{path}/"),
    }
}

/// Number of wildcard segments (`:name` or `*name`) in a route pattern.
pub(crate) fn count_params(path: &[u8]) -> usize {
    path.iter().filter(|&&b| b == b':' || b == b'*').count()
}
