//! Notification rendering.
//!
//! Pure functions from classified incidents to a plain-text body and an HTML
//! table body. Nothing here touches the network or disk.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::incident::{Incident, NO_PREFECTURE};
use crate::reconcile::{ChangeSet, Notice};

pub const CHANGES_SUBJECT: &str = "DEDDIE Power Outage Updates";
pub const SNAPSHOT_SUBJECT: &str = "DEDDIE Power Outage Updates (Test)";

const NEW_TITLE: &str = "ΝΕΕΣ ΔΙΑΚΟΠΕΣ ΔΕΔΔΗΕ";
const KNOWN_TITLE: &str = "ΓΝΩΣΤΕΣ ΔΙΑΚΟΠΕΣ ΔΕΔΔΗΕ";
const RESTORED_TITLE: &str = "ΑΠΟΚΑΤΑΣΤΑΣΕΙΣ";
const SNAPSHOT_TITLE: &str = "ΕΝΕΡΓΕΣ ΔΙΑΚΟΠΕΣ (TEST)";
const NO_ACTIVE: &str = "Καμία ενεργή διακοπή.";
const NO_ACTIVE_SNAPSHOT: &str = "No active outages (test).";
const UNKNOWN: &str = "Unknown";

const PAGE_OPEN: &str = "<html><body style='font-family:Segoe UI,Arial,sans-serif;'>";
const PAGE_CLOSE: &str = "</body></html>";
const HEADING_STYLE: &str = "margin:16px 0 8px 0;";

/// Column order of the HTML table.
const COLUMNS: [(Column, &str); 10] = [
    (Column::Prefecture, "Νομός"),
    (Column::Areas, "Επηρεαζόμενες περιοχές"),
    (Column::Start, "Έναρξη βλάβης"),
    (Column::EtaRestore, "Εκτιμώμενη αποκατάσταση"),
    (Column::AnnouncedRestore, "Ανακοινωμένη αποκατάσταση"),
    (Column::IncidentId, "Incident ID"),
    (Column::CreatedBy, "Created By"),
    (Column::Type, "Type"),
    (Column::Status, "Status"),
    (Column::PartitionId, "NE_ID"),
];

#[derive(Debug, Clone, Copy)]
enum Column {
    Prefecture,
    Areas,
    Start,
    EtaRestore,
    AnnouncedRestore,
    IncidentId,
    CreatedBy,
    Type,
    Status,
    PartitionId,
}

/// A rendered notification ready for a delivery transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// One incident formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Row {
    prefecture: String,
    partition_id: String,
    areas: String,
    start: String,
    eta_restore: String,
    announced_restore: String,
    incident_id: String,
    created_by: String,
    kind: String,
    status: String,
}

impl Row {
    fn cell(&self, column: Column) -> &str {
        match column {
            Column::Prefecture => &self.prefecture,
            Column::Areas => &self.areas,
            Column::Start => &self.start,
            Column::EtaRestore => &self.eta_restore,
            Column::AnnouncedRestore => &self.announced_restore,
            Column::IncidentId => &self.incident_id,
            Column::CreatedBy => &self.created_by,
            Column::Type => &self.kind,
            Column::Status => &self.status,
            Column::PartitionId => &self.partition_id,
        }
    }
}

/// Renders notices into message bodies.
#[derive(Debug, Clone, Copy)]
pub struct Composer {
    timezone: Tz,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Athens,
        }
    }
}

impl Composer {
    /// Render timestamps in the given zone.
    pub fn with_timezone(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Render a notice. Returns `None` for [`Notice::Quiet`].
    pub fn compose(&self, notice: &Notice) -> Option<RenderedMessage> {
        match notice {
            Notice::Changes(changes) => Some(self.changes(changes)),
            Notice::Snapshot(incidents) => Some(self.snapshot(incidents)),
            Notice::Quiet => None,
        }
    }

    /// New, known and restored sections.
    ///
    /// The known section is always present; when empty it says so
    /// explicitly. Restored incidents are always shown as `Restored`.
    pub fn changes(&self, changes: &ChangeSet) -> RenderedMessage {
        let mut text_sections = Vec::new();
        let mut html_sections = Vec::new();

        if !changes.new.is_empty() {
            let rows = self.rows(&changes.new, false);
            text_sections.push(rows_text(NEW_TITLE, &rows));
            html_sections.push(rows_html(NEW_TITLE, &rows));
        }

        if changes.known.is_empty() {
            text_sections.push(format!("{}\n{}", KNOWN_TITLE, NO_ACTIVE));
            html_sections.push(format!(
                "<h3 style='{}'>{}</h3><p>{}</p>",
                HEADING_STYLE,
                escape_html(KNOWN_TITLE),
                escape_html(NO_ACTIVE)
            ));
        } else {
            let rows = self.rows(&changes.known, false);
            text_sections.push(rows_text(KNOWN_TITLE, &rows));
            html_sections.push(rows_html(KNOWN_TITLE, &rows));
        }

        if !changes.restored.is_empty() {
            let rows = self.rows(&changes.restored, true);
            text_sections.push(rows_text(RESTORED_TITLE, &rows));
            html_sections.push(rows_html(RESTORED_TITLE, &rows));
        }

        RenderedMessage {
            subject: CHANGES_SUBJECT.to_string(),
            text: text_sections.join("\n\n").trim().to_string(),
            html: Some(format!("{}{}{}", PAGE_OPEN, html_sections.concat(), PAGE_CLOSE)),
        }
    }

    /// Every current incident, for forced test notifications.
    pub fn snapshot(&self, incidents: &[Incident]) -> RenderedMessage {
        if incidents.is_empty() {
            return RenderedMessage {
                subject: SNAPSHOT_SUBJECT.to_string(),
                text: NO_ACTIVE_SNAPSHOT.to_string(),
                html: Some(format!("<html><body><p>{}</p></body></html>", NO_ACTIVE_SNAPSHOT)),
            };
        }

        let rows = self.rows(incidents, false);
        RenderedMessage {
            subject: SNAPSHOT_SUBJECT.to_string(),
            text: rows_text(SNAPSHOT_TITLE, &rows),
            html: Some(format!(
                "{}{}{}",
                PAGE_OPEN,
                rows_html(SNAPSHOT_TITLE, &rows),
                PAGE_CLOSE
            )),
        }
    }

    fn rows(&self, incidents: &[Incident], restored: bool) -> Vec<Row> {
        let mut sorted: Vec<&Incident> = incidents.iter().collect();
        sorted.sort_by_key(|incident| incident.key());
        sorted
            .into_iter()
            .map(|incident| self.row(incident, restored))
            .collect()
    }

    fn row(&self, incident: &Incident, restored: bool) -> Row {
        let areas = if incident.affected_areas.is_empty() {
            UNKNOWN.to_string()
        } else {
            incident
                .affected_areas
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };

        Row {
            prefecture: prefecture_label(&incident.prefecture),
            partition_id: incident.partition_id.clone(),
            areas,
            start: format_epoch_ms(incident.start_time, self.timezone),
            eta_restore: format_epoch_ms(incident.eta_restore_time, self.timezone),
            announced_restore: format_epoch_ms(incident.announced_restore_time, self.timezone),
            incident_id: incident.incident_id.to_string(),
            created_by: incident.creator.clone(),
            kind: type_label(&incident.cause, incident.is_scheduled),
            status: status_label(incident.is_active, restored).to_string(),
        }
    }
}

/// Format an epoch-milliseconds instant as `dd/mm/YYYY HH:MM` in `timezone`.
///
/// Absent values render as `Unknown`; values outside the representable
/// range render as the raw number.
pub fn format_epoch_ms(value: Option<i64>, timezone: Tz) -> String {
    let Some(ms) = value else {
        return UNKNOWN.to_string();
    };
    match DateTime::from_timestamp_millis(ms) {
        Some(utc) => utc.with_timezone(&timezone).format("%d/%m/%Y %H:%M").to_string(),
        None => ms.to_string(),
    }
}

/// Display label for an outage cause.
pub fn type_label(cause: &str, is_scheduled: bool) -> String {
    if is_scheduled {
        return "Scheduled Outage".to_string();
    }
    let cause = cause.trim().to_uppercase();
    match cause.as_str() {
        "OUTAGE" | "EMERGENCY" => "Emergency Outage".to_string(),
        "SCHEDULED" => "Scheduled Outage".to_string(),
        "" => UNKNOWN.to_string(),
        other => title_case(&other.replace('_', " ")),
    }
}

pub fn status_label(is_active: bool, restored: bool) -> &'static str {
    if restored {
        "Restored"
    } else if is_active {
        "Active"
    } else {
        "Inactive"
    }
}

/// Prefecture name without a leading "Νομός ".
pub fn prefecture_label(prefecture: &str) -> String {
    const PREFIX: &str = "νομός ";

    let text = crate::normalize::normalize_text(prefecture);
    if text.is_empty() {
        return NO_PREFECTURE.to_string();
    }
    let prefix_chars = PREFIX.chars().count();
    let head: String = text.chars().take(prefix_chars).collect();
    if head.to_lowercase() == PREFIX {
        text.chars().skip(prefix_chars).collect::<String>().trim().to_string()
    } else {
        text
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn rows_text(title: &str, rows: &[Row]) -> String {
    let mut lines = vec![title.to_string()];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(format!("{}. {} | NE_ID: {}", idx + 1, row.prefecture, row.partition_id));
        lines.push(format!("Επηρεαζόμενες περιοχές: {}", row.areas));
        lines.push(format!(
            "Έναρξη: {} | ETA: {} | Ανακοινωμένη: {}",
            row.start, row.eta_restore, row.announced_restore
        ));
        lines.push(format!(
            "Incident ID: {} | Created By: {} | Type: {} | Status: {}",
            row.incident_id, row.created_by, row.kind, row.status
        ));
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string()
}

fn rows_html(title: &str, rows: &[Row]) -> String {
    let mut html = format!(
        "<h3 style='{}'>{}</h3>\
         <table style='border-collapse:collapse;width:100%;font-family:Segoe UI,Arial,sans-serif;font-size:13px;'>\
         <thead><tr>",
        HEADING_STYLE,
        escape_html(title)
    );
    for (_, header) in COLUMNS {
        html.push_str(&format!(
            "<th style='border:1px solid #999;padding:6px;text-align:left;background:#f2f2f2;'>{}</th>",
            escape_html(header)
        ));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for (column, _) in COLUMNS {
            html.push_str(&format!(
                "<td style='border:1px solid #999;padding:6px;vertical-align:top;'>{}</td>",
                escape_html(row.cell(column))
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}
