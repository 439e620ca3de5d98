//! Prompt template rendering.

/// Render a prompt template, replacing `{key}` placeholders with values.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
/// Substitution is a single left-to-right pass, so braces inside a
/// substituted value (user text, JSON schemas) are never re-expanded.
/// Unknown placeholders are left as-is.
///
/// # Example
///
/// ```
/// use contact_extractor::prompt::render;
///
/// let result = render("Hello {name}, JSON: {{\"key\": \"val\"}}", &[("name", "Raj")]);
/// assert_eq!(result, r#"Hello Raj, JSON: {"key": "val"}"#);
/// ```
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
        } else if tail.starts_with('{') {
            let substituted = tail[1..].find('}').and_then(|end| {
                let key = &tail[1..1 + end];
                vars.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| (*v, end + 2))
            });
            match substituted {
                Some((value, consumed)) => {
                    out.push_str(value);
                    rest = &tail[consumed..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
