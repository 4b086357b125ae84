use crate::tree::Node;

const INDENT: &str = "    ";

/// Render the bookmark forest as a Netscape bookmark file. The degenerate
/// empty forest still yields a minimal valid document.
pub fn render_bookmarks_html(nodes: &[Node]) -> String {
    let mut lines = vec![
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>".to_string(),
        "<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">".to_string(),
        "<TITLE>Bookmarks</TITLE>".to_string(),
        "<H1>Bookmarks</H1>".to_string(),
        "<DL><p>".to_string(),
    ];
    render_nodes(nodes, 1, &mut lines);
    lines.push("</DL><p>".to_string());
    lines.push(String::new());
    lines.join("\n")
}

fn render_nodes(nodes: &[Node], depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);
    for node in nodes {
        match node {
            Node::Folder(folder) => {
                let title = escape_html(&folder.title);
                lines.push(format!("{indent}<DT><H3>{title}</H3>"));
                lines.push(format!("{indent}<DL><p>"));
                render_nodes(&folder.children, depth + 1, lines);
                lines.push(format!("{indent}</DL><p>"));
            }
            Node::Bookmark(bookmark) => {
                let title = escape_html(&bookmark.title);
                let url = escape_html(&bookmark.url);
                lines.push(format!("{indent}<DT><A HREF=\"{url}\">{title}</A>"));
            }
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
