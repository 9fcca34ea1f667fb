const INDEX_HTML: &str = include_str!("../templates/index.html");
const SUMMARY_SLOT: &str = "{{ summary_block }}";

/// Renders the upload form, plus the summary section when there is one.
pub fn render_index(short_summary: Option<&str>) -> String {
    let block = match short_summary {
        Some(summary) => format!(
            "    <h2>Summary</h2>\n    <div class=\"summary\">{}</div>",
            escape_html(summary)
        ),
        None => String::new(),
    };
    INDEX_HTML.replace(SUMMARY_SLOT, &block)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
