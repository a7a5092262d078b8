use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::{ports::ArchivedMessage, Result};

/// Minimal HTML escaping for archive text content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Deterministic artifact name: channel name plus export timestamp.
pub fn archive_file_name(channel_name: &str, exported_at: DateTime<Utc>) -> String {
    format!("ticket_{channel_name}-{}.html", exported_at.timestamp())
}

/// Render a channel history into a self-contained HTML document.
///
/// Messages are expected oldest first. Empty histories and messages without
/// text content are valid; attachments become links and rich embedded
/// content is only marked as present, never serialized.
pub fn render_archive(
    channel_name: &str,
    exported_at: DateTime<Utc>,
    history: &[ArchivedMessage],
) -> String {
    let mut lines = Vec::new();
    lines.push("<!doctype html>".to_string());
    lines.push(
        "<html><head><meta charset='utf-8'><title>Ticket Log</title></head><body>".to_string(),
    );
    lines.push(format!("<h2>Channel: {}</h2>", escape_html(channel_name)));
    lines.push(format!("<h3>Exported: {} (UTC)</h3>", exported_at.to_rfc3339()));
    lines.push("<hr>".to_string());

    for m in history {
        let author = escape_html(&format!("{} ({})", m.author_name, m.author_id.0));
        lines.push("<div style='margin-bottom:12px;padding:8px;border:1px solid #ddd;'>".into());
        lines.push(format!(
            "<div style='color:#666;font-size:12px;'>[{}] {author}</div>",
            m.sent_at.to_rfc3339()
        ));
        if !m.content.is_empty() {
            let text: Vec<String> = m.content.lines().map(escape_html).collect();
            lines.push(format!(
                "<div style='margin-top:6px;'>{}</div>",
                text.join("<br>")
            ));
        }
        for url in &m.attachment_urls {
            let url = escape_html(url);
            lines.push(format!(
                "<div>Attachment: <a href='{url}' target='_blank'>{url}</a></div>"
            ));
        }
        if m.has_embeds {
            lines.push("<div>Embed present</div>".into());
        }
        lines.push("</div>".into());
    }

    lines.push("</body></html>".to_string());
    lines.join("\n")
}

/// An archive artifact spooled to disk, removed again on drop.
///
/// Delivery is best-effort; the drop guard guarantees cleanup on every exit
/// path, delivered or not.
pub struct TempArchive {
    path: PathBuf,
}

impl TempArchive {
    /// Render `history` and write the artifact into `spool_dir`.
    pub fn write(
        spool_dir: &Path,
        channel_name: &str,
        history: &[ArchivedMessage],
    ) -> Result<Self> {
        let exported_at = Utc::now();
        let path = spool_dir.join(archive_file_name(channel_name, exported_at));
        fs::write(&path, render_archive(channel_name, exported_at, history))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %err, "failed to remove archive artifact");
            }
        }
    }
}
