// src/dependency/repair.rs

//! Best-effort repair of hand-written requirement strings
//!
//! Only the version clause is touched: the marker after `;` and direct URL
//! references are left as written. Each run of operator characters is
//! replaced by the operator it most plausibly meant, and junk between an
//! operator and its version number is dropped.

use super::specifier::is_operator_char;

/// Repair a raw specifier so it has a chance of parsing
///
/// `Foo_Bar=1.0` becomes `Foo_Bar==1.0`, `foo=>2` becomes `foo>=2`,
/// `foo>>1` becomes `foo>1` and `foo>=v1.2` becomes `foo>=1.2`.
pub fn repair(raw: &str) -> String {
    let cleaned = raw.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    let (head, marker) = match cleaned.split_once(';') {
        Some((head, marker)) => (head.trim_end(), Some(marker.trim())),
        None => (cleaned, None),
    };

    let head = if head.contains('@') {
        head.to_string()
    } else {
        repair_version_clause(head)
    };

    match marker {
        Some(marker) if !marker.is_empty() => format!("{}; {}", head, marker),
        _ => head,
    }
}

fn repair_version_clause(head: &str) -> String {
    let chars: Vec<char> = head.chars().collect();
    let mut out = String::with_capacity(head.len() + 2);
    let mut in_extras = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '[' => in_extras = true,
            ']' => in_extras = false,
            _ => {}
        }

        if in_extras || !is_operator_char(c) {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && is_operator_char(chars[i]) {
            i += 1;
        }
        let run: String = chars[start..i].iter().collect();
        out.push_str(canonical_operator(&run));

        if let Some(offset) = noise_before_version(&chars[i..]) {
            i += offset;
        }
    }

    out
}

/// The operator a run of operator characters most plausibly means
fn canonical_operator(run: &str) -> &str {
    let has = |c: char| run.contains(c);

    if has('~') {
        "~="
    } else if has('!') {
        "!="
    } else if has('<') && has('>') {
        run
    } else if has('<') {
        if has('=') { "<=" } else { "<" }
    } else if has('>') {
        if has('=') { ">=" } else { ">" }
    } else {
        "=="
    }
}

/// Length of the junk between an operator and the first digit of its version
///
/// `None` when no digit follows before the clause ends, so `==*` or a
/// missing version is left for the parser to report.
fn noise_before_version(rest: &[char]) -> Option<usize> {
    for (offset, c) in rest.iter().enumerate() {
        if c.is_ascii_digit() {
            return Some(offset);
        }
        if matches!(c, ',' | ')') || is_operator_char(*c) {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_equals() {
        assert_eq!(repair("Foo_Bar=1.0"), "Foo_Bar==1.0");
        assert_eq!(repair("foo===1.0"), "foo==1.0");
        assert_eq!(repair("foo==1.0"), "foo==1.0");
    }

    #[test]
    fn test_operator_runs() {
        assert_eq!(repair("foo=>2"), "foo>=2");
        assert_eq!(repair("foo=<2"), "foo<=2");
        assert_eq!(repair("foo>>1"), "foo>1");
        assert_eq!(repair("foo<<1"), "foo<1");
        assert_eq!(repair("foo~1.4"), "foo~=1.4");
        assert_eq!(repair("foo!1.4"), "foo!=1.4");
        assert_eq!(repair("foo<>1"), "foo<>1");
    }

    #[test]
    fn test_noise_stripped() {
        assert_eq!(repair("foo>=v1.2"), "foo>=1.2");
        assert_eq!(repair("foo >= 1.2, < 2"), "foo >=1.2, <2");
        assert_eq!(repair("foo (>= 1.2)"), "foo (>=1.2)");
        assert_eq!(repair("foo==*"), "foo==*");
    }

    #[test]
    fn test_trailing_separators() {
        assert_eq!(repair("requests;"), "requests");
        assert_eq!(repair("requests ; ; "), "requests");
    }

    #[test]
    fn test_marker_untouched() {
        assert_eq!(
            repair("foo=1.0 ; python_version<'3.8'"),
            "foo==1.0; python_version<'3.8'"
        );
    }

    #[test]
    fn test_extras_and_urls_untouched() {
        assert_eq!(repair("foo[a,b]>=1"), "foo[a,b]>=1");
        assert_eq!(
            repair("pip @ https://example.com/pip.zip?v=1"),
            "pip @ https://example.com/pip.zip?v=1"
        );
    }

    #[test]
    fn test_repair_is_idempotent() {
        for raw in ["Foo_Bar=1.0", "foo=>v2", "foo >= 1.2, < 2; os_name=='nt'"] {
            let once = repair(raw);
            assert_eq!(repair(&once), once);
        }
    }
}
