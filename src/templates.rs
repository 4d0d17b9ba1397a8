//! Variable-substitution templates.
//!
//! Not a template language: `{{ name }}` markers are replaced by the named
//! variable's string form, nothing else. Loops, conditionals and escaping do
//! not exist here.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Body returned when the template file cannot be read.
const MISSING_TEMPLATE: &str = "<h1>Not Found Template.</h1>";

fn marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\{\{(.*?)\}\}").unwrap())
}

/// Renders the template at `dir/name` with `vars`.
///
/// Each `{{ key }}` marker is replaced by `vars[key]`, or by the empty string
/// when the key is absent. Whitespace inside the braces is ignored. When
/// `vars` is empty the file content passes through untouched, markers and all.
pub fn render(dir: &Path, name: &str, vars: &HashMap<String, String>) -> String {
    let Ok(mut content) = fs::read_to_string(dir.join(name)) else {
        return MISSING_TEMPLATE.to_owned();
    };
    if vars.is_empty() {
        return content;
    }
    let markers: Vec<(String, String)> = marker()
        .captures_iter(&content)
        .map(|c| (c[0].to_owned(), c[1].trim().to_owned()))
        .collect();
    for (marker, key) in markers {
        let value = vars.get(&key).map(String::as_str).unwrap_or("");
        content = content.replace(&marker, value);
    }
    content
}

/// Convenience for building the `vars` argument inline.
///
/// ```rust
/// use kado::templates;
///
/// let vars = templates::vars([("user", "alice"), ("title", "home")]);
/// assert_eq!(vars.get("user").map(String::as_str), Some("alice"));
/// ```
pub fn vars<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_template(dir: &Path, name: &str, content: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn substitutes_named_markers() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "index.html", "<p>hi {{ user }}, {{message}}</p>");
        let out = render(dir.path(), "index.html", &vars([("user", "alice"), ("message", "welcome")]));
        assert_eq!(out, "<p>hi alice, welcome</p>");
    }

    #[test]
    fn missing_variable_becomes_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "<p>{{ user }}</p>");
        let out = render(dir.path(), "page.html", &vars([("other", "x")]));
        assert_eq!(out, "<p></p>");
    }

    #[test]
    fn empty_vars_pass_content_through() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "page.html", "<p>{{ user }}</p>");
        let out = render(dir.path(), "page.html", &HashMap::new());
        assert_eq!(out, "<p>{{ user }}</p>");
    }

    #[test]
    fn missing_template_renders_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let out = render(dir.path(), "absent.html", &HashMap::new());
        assert_eq!(out, MISSING_TEMPLATE);
    }
}
