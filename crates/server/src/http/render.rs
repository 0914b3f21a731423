//! HTML rendering of directory listings.

use access::Entry;
use urlencoding::encode;

const STYLE: &str = "
        body { font-family: Arial, sans-serif; margin: 2rem; }
        h1 { margin-bottom: 0.5rem; }
        table { width: 100%; border-collapse: collapse; margin-top: 1rem; }
        th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #ddd; }
        a { color: #0a5ec2; text-decoration: none; }
        a:hover { text-decoration: underline; }
        .crumbs { font-size: 0.9rem; color: #555; }
        .top-bar { display: flex; justify-content: space-between; align-items: center; }
        .upload-hint { font-size: 0.9rem; color: #333; margin-top: 1rem; }
";

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode each segment of a slash-separated path, keeping the slashes.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a byte count with thousands separators, e.g. `1,234 bytes`.
pub fn format_size(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped} bytes")
}

fn browse_href(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        format!("/?path={}", encode_path(path))
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Breadcrumb trail as `(label, href)` pairs, starting with `Home`.
pub fn breadcrumbs(path: &str) -> Vec<(String, String)> {
    let mut crumbs = vec![("Home".to_string(), "/".to_string())];
    let mut running = Vec::new();
    for segment in segments(path) {
        running.push(segment);
        crumbs.push((segment.to_string(), browse_href(&running.join("/"))));
    }
    crumbs
}

/// Link to the parent of `path`, or `None` at the root.
pub fn parent_href(path: &str) -> Option<String> {
    let parts = segments(path);
    if parts.is_empty() {
        return None;
    }
    Some(browse_href(&parts[..parts.len() - 1].join("/")))
}

fn entry_row(entry: &Entry) -> String {
    let (href, display_name, size) = if entry.is_dir {
        (
            browse_href(&entry.relative_path),
            format!("{}/", entry.name),
            "--".to_string(),
        )
    } else {
        (
            format!("/download/{}", encode_path(&entry.relative_path)),
            entry.name.clone(),
            entry.size.map(format_size).unwrap_or_else(|| "--".to_string()),
        )
    };

    format!(
        "<tr><td><a href='{}'>{}</a></td><td>{}</td></tr>",
        escape_html(&href),
        escape_html(&display_name),
        size
    )
}

/// Everything needed to render one listing page.
pub struct ListingPage<'a> {
    /// Relative path of the listed directory.
    pub path: &'a str,
    /// Directory contents in display order.
    pub entries: &'a [Entry],
    /// Current upload token; the upload hint is shown when present.
    pub upload_token: Option<&'a str>,
    /// Host the client used to reach the server, for the upload hint.
    pub host: &'a str,
}

impl ListingPage<'_> {
    pub fn render(&self) -> String {
        let rows = if self.entries.is_empty() {
            "<tr><td colspan='2'>Directory is empty.</td></tr>".to_string()
        } else {
            self.entries.iter().map(entry_row).collect()
        };

        let crumbs = breadcrumbs(self.path)
            .iter()
            .map(|(label, href)| {
                format!(
                    "<a href='{}'>{}</a>",
                    escape_html(href),
                    escape_html(label)
                )
            })
            .collect::<Vec<_>>()
            .join(" / ");

        let parent_link = parent_href(self.path)
            .map(|href| format!("<a href='{}'>&larr; Up one level</a>", escape_html(&href)))
            .unwrap_or_default();

        let upload_hint = self
            .upload_token
            .map(|token| {
                format!(
                    "<p>Upload with: curl -T myfile.txt http://{}/upload/{}/myfile.txt</p>",
                    escape_html(self.host),
                    escape_html(token)
                )
            })
            .unwrap_or_default();

        format!(
            "<!DOCTYPE html>
<html lang='en'>
<head>
    <meta charset='utf-8'>
    <title>File Access Service</title>
    <link rel='icon' href='/favicon.ico' type='image/x-icon'>
    <style>{STYLE}    </style>
</head>
<body>
    <div class='top-bar'>
        <h1>File Access Service</h1>
        <div>{parent_link}</div>
    </div>
    <div class='crumbs'>{crumbs}</div>
    <div class='upload-hint'>{upload_hint}</div>
    <table>
        <thead>
            <tr><th>Name</th><th>Size</th></tr>
        </thead>
        <tbody>
            {rows}
        </tbody>
    </table>
</body>
</html>
"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, relative_path: &str, size: u64) -> Entry {
        Entry {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            is_dir: false,
            size: Some(size),
        }
    }

    fn dir(name: &str, relative_path: &str) -> Entry {
        Entry {
            name: name.to_string(),
            relative_path: relative_path.to_string(),
            is_dir: true,
            size: None,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(999), "999 bytes");
        assert_eq!(format_size(1000), "1,000 bytes");
        assert_eq!(format_size(1234567), "1,234,567 bytes");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href='x'>\"&\"</a>"),
            "&lt;a href=&#x27;x&#x27;&gt;&quot;&amp;&quot;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_encode_path_keeps_slashes() {
        assert_eq!(encode_path("my docs/a b.txt"), "my%20docs/a%20b.txt");
        assert_eq!(encode_path("q?/#frag"), "q%3F/%23frag");
    }

    #[test]
    fn test_breadcrumbs() {
        assert_eq!(breadcrumbs(""), vec![("Home".to_string(), "/".to_string())]);
        assert_eq!(
            breadcrumbs("docs/2024"),
            vec![
                ("Home".to_string(), "/".to_string()),
                ("docs".to_string(), "/?path=docs".to_string()),
                ("2024".to_string(), "/?path=docs/2024".to_string()),
            ]
        );
    }

    #[test]
    fn test_parent_href() {
        assert_eq!(parent_href(""), None);
        assert_eq!(parent_href("docs"), Some("/".to_string()));
        assert_eq!(parent_href("docs/2024"), Some("/?path=docs".to_string()));
        assert_eq!(parent_href("docs/2024/"), Some("/?path=docs".to_string()));
    }

    #[test]
    fn test_render_rows() {
        let entries = vec![dir("images", "images"), file("a b.txt", "a b.txt", 2048)];
        let html = ListingPage {
            path: "",
            entries: &entries,
            upload_token: None,
            host: "localhost:8000",
        }
        .render();

        assert!(html.contains("<a href='/?path=images'>images/</a></td><td>--</td>"));
        assert!(html.contains("<a href='/download/a%20b.txt'>a b.txt</a></td><td>2,048 bytes</td>"));
        assert!(!html.contains("Upload with"));
        assert!(!html.contains("Up one level"));
    }

    #[test]
    fn test_render_empty_directory_with_parent() {
        let html = ListingPage {
            path: "docs",
            entries: &[],
            upload_token: None,
            host: "localhost:8000",
        }
        .render();

        assert!(html.contains("Directory is empty."));
        assert!(html.contains("<a href='/'>&larr; Up one level</a>"));
        assert!(html.contains("<a href='/?path=docs'>docs</a>"));
    }

    #[test]
    fn test_render_upload_hint() {
        let html = ListingPage {
            path: "",
            entries: &[],
            upload_token: Some("AbCdEfGh12345678"),
            host: "files.example:8000",
        }
        .render();

        assert!(html.contains(
            "curl -T myfile.txt http://files.example:8000/upload/AbCdEfGh12345678/myfile.txt"
        ));
    }

    #[test]
    fn test_render_escapes_names() {
        let entries = vec![file("<script>.txt", "<script>.txt", 1)];
        let html = ListingPage {
            path: "",
            entries: &entries,
            upload_token: None,
            host: "localhost",
        }
        .render();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;.txt"));
    }
}
