pub mod cards;
pub mod form;
pub mod projections;
pub mod recommendations;

use crate::session::Flash;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1f2933; }
header { background: #1f3a5f; color: #fff; padding: 1rem 2rem; }
header a { color: #fff; text-decoration: none; font-weight: 600; }
main { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
.flash { padding: .75rem 1rem; border-radius: 4px; margin-bottom: .75rem; }
.flash-error { background: #fde8e8; color: #9b1c1c; }
.flash-warning { background: #fdf6b2; color: #723b13; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
.card { background: #fff; border-radius: 6px; padding: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.card-header { display: flex; justify-content: space-between; align-items: baseline; }
.badge { display: inline-block; background: #e5e7eb; border-radius: 999px; padding: .1rem .6rem; font-size: .8rem; }
.risk-low { color: #057a55; } .risk-medium { color: #b45309; } .risk-high { color: #c81e1e; }
.btn { display: inline-block; background: #1f3a5f; color: #fff; border: 0; border-radius: 4px; padding: .5rem 1rem; text-decoration: none; cursor: pointer; }
.btn:disabled { opacity: .5; cursor: wait; }
.panel { background: #fff; border-radius: 6px; padding: 1.5rem; }
form .field { margin-bottom: 1rem; }
form label { display: block; font-weight: 600; margin-bottom: .25rem; }
dl { display: grid; grid-template-columns: auto 1fr; gap: .25rem 1rem; }
dt { color: #6b7280; }
"#;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// JSON for embedding inside a `<script>` element.
pub fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn render_flashes(flashes: &[Flash]) -> String {
    let mut out = String::new();
    for f in flashes {
        let _ = write!(
            out,
            r#"<div class="flash flash-{}">{}</div>"#,
            f.category.as_str(),
            escape_html(&f.message)
        );
    }
    out
}

pub fn layout(title: &str, flashes: &[Flash], body: &str, scripts: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | StockPick</title>
<style>{STYLE}</style>
</head>
<body>
<header><a href="/">StockPick</a></header>
<main>
{flashes}
{body}
</main>
{scripts}
</body>
</html>"#,
        title = escape_html(title),
        flashes = render_flashes(flashes),
    )
}

/// `12.3456` as `12.35%`; missing or non-finite values as `N/A`.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "N/A".to_string(),
    }
}

pub fn fmt_num(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashCategory;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">AT&T's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;AT&amp;T&#x27;s&lt;/a&gt;"
        );
    }

    #[test]
    fn script_json_cannot_close_the_script() {
        let s = script_json(&serde_json::json!({ "name": "</script><b>" }));
        assert!(!s.contains("</script>"));
    }

    #[test]
    fn layout_renders_flashes_by_category() {
        let html = layout(
            "Home",
            &[Flash {
                category: FlashCategory::Warning,
                message: "careful <now>".to_string(),
            }],
            "<p>body</p>",
            "",
        );
        assert!(html.contains(r#"<div class="flash flash-warning">careful &lt;now&gt;</div>"#));
        assert!(html.contains("<title>Home | StockPick</title>"));
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(fmt_pct(Some(12.3456)), "12.35%");
        assert_eq!(fmt_pct(Some(f64::NAN)), "N/A");
        assert_eq!(fmt_pct(None), "N/A");
    }
}
