//! List rendering.
//!
//! The dashboard keeps a list of [`ListEntry`] view models; the terminal UI,
//! the table output and the HTML markup all render from them.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};

use crate::model::Satellite;

/// Shown when a record carries no update time.
pub const UNKNOWN_DATE: &str = "unknown";

/// One rendered row of the satellite list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// NORAD catalog number.
    pub norad_id: u32,
    /// Object name.
    pub name: String,
    /// Last update as local time.
    pub updated: String,
    /// Detail page link.
    pub href: String,
}

impl From<&Satellite> for ListEntry {
    fn from(satellite: &Satellite) -> Self {
        Self {
            norad_id: satellite.norad_id,
            name: satellite.name.clone(),
            updated: format_date(satellite.last_updated),
            href: satellite.detail_path(),
        }
    }
}

/// Format a timestamp in the local time zone.
#[must_use]
pub fn format_date(when: Option<DateTime<Utc>>) -> String {
    when.map_or_else(
        || UNKNOWN_DATE.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for the satellite list, one linked item per entry.
#[must_use]
pub fn satellite_list_markup(entries: &[ListEntry]) -> String {
    let mut html = String::new();
    for entry in entries {
        let _ = write!(
            html,
            concat!(
                "<div class=\"satellite-item\">",
                "<a href=\"{href}\" class=\"satellite-link\">",
                "<h3>{name}</h3>",
                "<div class=\"satellite-meta\">",
                "<span>NORAD ID: {id}</span>",
                "<span>Updated: {updated}</span>",
                "</div></a></div>\n"
            ),
            href = escape_html(&entry.href),
            name = escape_html(&entry.name),
            id = entry.norad_id,
            updated = escape_html(&entry.updated),
        );
    }
    html
}

/// Plain-text table of the entries with aligned columns.
#[must_use]
pub fn satellite_table(entries: &[ListEntry]) -> String {
    const ID: &str = "NORAD ID";
    const NAME: &str = "NAME";
    const UPDATED: &str = "UPDATED";

    let id_width = entries
        .iter()
        .map(|e| e.norad_id.to_string().len())
        .chain([ID.len()])
        .max()
        .unwrap_or(ID.len());
    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .chain([NAME.len()])
        .max()
        .unwrap_or(NAME.len());

    let mut out = String::new();
    let _ = writeln!(out, "{ID:<id_width$}  {NAME:<name_width$}  {UPDATED}");
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(id_width),
        "-".repeat(name_width),
        "-".repeat(UPDATED.len())
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<name_width$}  {}",
            entry.norad_id, entry.name, entry.updated
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(id: u32, name: &str) -> ListEntry {
        ListEntry::from(&Satellite::new(id, name, None))
    }

    #[test]
    fn test_entry_from_satellite() {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let e = ListEntry::from(&Satellite::new(25544, "ISS", Some(when)));
        assert_eq!(e.href, "/satellite/25544");
        assert_eq!(e.updated, format_date(Some(when)));
        assert_ne!(e.updated, UNKNOWN_DATE);
    }

    #[test]
    fn test_format_missing_date() {
        assert_eq!(format_date(None), UNKNOWN_DATE);
    }

    #[test]
    fn test_markup_links_each_entry() {
        let html = satellite_list_markup(&[entry(25544, "ISS"), entry(20580, "HST")]);
        assert_eq!(html.matches("class=\"satellite-item\"").count(), 2);
        assert!(html.contains("<a href=\"/satellite/25544\" class=\"satellite-link\">"));
        assert!(html.contains("<h3>HST</h3>"));
        assert!(html.contains("<span>NORAD ID: 20580</span>"));
        assert!(html.contains("<span>Updated: unknown</span>"));
    }

    #[test]
    fn test_markup_escapes_names() {
        let html = satellite_list_markup(&[entry(1, "<b>R&D</b>")]);
        assert!(html.contains("<h3>&lt;b&gt;R&amp;D&lt;/b&gt;</h3>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        assert!(satellite_list_markup(&[]).is_empty());
    }

    #[test]
    fn test_table_alignment() {
        let table = satellite_table(&[entry(25544, "ISS (ZARYA)"), entry(5, "X")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("NORAD ID  NAME"));
        assert!(lines[2].starts_with("25544     ISS (ZARYA)  "));
        assert!(lines[3].starts_with("5         X            "));
    }
}
