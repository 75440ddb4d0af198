//! Diff rendering for fixture comparison.

/// Render a line diff between expected and actual output.
///
/// Lines are shown with control bytes escaped so trailing spaces and
/// embedded NULs stay visible. Extra lines on either side are reported.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let exp: Vec<&str> = expected.split('\n').collect();
    let act: Vec<&str> = actual.split('\n').collect();
    let mut out = String::from("--- expected\n+++ actual\n");
    for i in 0..exp.len().max(act.len()) {
        let (e, a) = (exp.get(i), act.get(i));
        if e == a {
            continue;
        }
        out.push_str(&format!("@@ line {} @@\n", i + 1));
        if let Some(e) = e {
            out.push_str(&format!("-{}\n", visible(e)));
        }
        if let Some(a) = a {
            out.push_str(&format!("+{}\n", visible(a)));
        }
    }
    out
}

/// Quote a line, escaping control characters.
fn visible(line: &str) -> String {
    format!("{line:?}")
}

/// One-line note for a return-value mismatch.
#[must_use]
pub fn render_return_mismatch(expected: i32, actual: i32) -> String {
    format!("return: expected {expected}, got {actual}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_marked() {
        assert_eq!(render_diff("abc", "abc"), "[identical]");
    }

    #[test]
    fn changed_line_shows_both_sides() {
        let d = render_diff("   42", "42   ");
        assert!(d.contains("@@ line 1 @@"));
        assert!(d.contains("-\"   42\""));
        assert!(d.contains("+\"42   \""));
    }

    #[test]
    fn extra_actual_line_is_reported() {
        let d = render_diff("a", "a\nb");
        assert!(d.contains("@@ line 2 @@"));
        assert!(d.contains("+\"b\""));
        assert!(!d.contains("@@ line 1 @@"));
    }

    #[test]
    fn nul_bytes_are_escaped() {
        let d = render_diff("x", "x\0");
        assert!(d.contains("\\0"));
    }
}
