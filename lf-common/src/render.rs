//! HTML fragment renderer
//!
//! Produces the markup swapped into the `items-grid` and `pending-list`
//! containers. Every user-supplied field goes through [`escape_html`].

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

use crate::item::NOT_SPECIFIED;
use crate::{Item, ItemStatus};

/// Fixed subject line for contact e-mails
pub const MAILTO_SUBJECT: &str = "Lost & Found Inquiry";

/// Message shown when the item source could not be loaded
pub const LOAD_ERROR_MESSAGE: &str =
    "Could not load items right now. Please try again in a few minutes.";

/// Message shown when no submission awaits review
pub const NO_PENDING_MESSAGE: &str = "No pending items to review. You're all caught up!";

// Keep '@' '.' '-' '_' readable in the address part
const MAILTO_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'@')
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

/// What the grid container should show
#[derive(Debug, Clone)]
pub enum GridView<'a> {
    Loading,
    Failed,
    Items {
        items: Vec<&'a Item>,
        tab: ItemStatus,
        query: &'a str,
    },
}

/// Escaped field text, or the placeholder for a missing field
fn field_or_placeholder(text: &str) -> String {
    if text.trim().is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        escape_html(text)
    }
}

/// Escape text for element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `mailto:` link addressed to `email` with the fixed subject (not yet HTML-escaped)
pub fn mailto_link(email: &str) -> String {
    format!(
        "mailto:{}?subject={}",
        utf8_percent_encode(email.trim(), MAILTO_ENCODE_SET),
        utf8_percent_encode(MAILTO_SUBJECT, NON_ALPHANUMERIC)
    )
}

pub fn render_loading() -> String {
    r#"<div class="state state-loading"><i class="fa-solid fa-spinner fa-spin"></i> Loading items...</div>"#
        .to_string()
}

pub fn render_error() -> String {
    format!(
        r#"<div class="state state-error"><i class="fa-solid fa-triangle-exclamation"></i> {}</div>"#,
        LOAD_ERROR_MESSAGE
    )
}

/// Empty-state message for the active tab and query
pub fn empty_state_message(tab: ItemStatus, query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        format!("No {} items have been reported yet.", tab.label())
    } else {
        format!("No {} items match \"{}\".", tab.label(), query)
    }
}

pub fn render_empty_state(tab: ItemStatus, query: &str) -> String {
    format!(
        r#"<div class="state state-empty">{}</div>"#,
        escape_html(&empty_state_message(tab, query))
    )
}

fn render_contact_button(item: &Item) -> String {
    match item.contact_email() {
        Some(email) => format!(
            r#"<button type="button" class="btn btn-contact" data-mailto="{}"><i class="fa-solid fa-envelope"></i> Contact</button>"#,
            escape_html(&mailto_link(email))
        ),
        None => r#"<button type="button" class="btn btn-contact" disabled>No contact</button>"#
            .to_string(),
    }
}

/// One public card
pub fn render_card(item: &Item) -> String {
    let status = item.status.as_str();
    format!(
        r#"<div class="card {status}" data-id="{id}">
  <span class="tag {status}">{label}</span>
  <h3><i class="{icon}"></i> {name}</h3>
  <small>{date}</small>
  <p><strong>Location:</strong> {location}</p>
  <p>{description}</p>
  {contact}
</div>
"#,
        status = status,
        id = escape_html(&item.id),
        label = item.status.label(),
        icon = item.category.icon(),
        name = escape_html(&item.name),
        date = escape_html(&item.date),
        location = field_or_placeholder(&item.location),
        description = field_or_placeholder(&item.description),
        contact = render_contact_button(item),
    )
}

/// Render the grid container contents
pub fn render_grid(view: &GridView<'_>) -> String {
    match view {
        GridView::Loading => render_loading(),
        GridView::Failed => render_error(),
        GridView::Items { items, tab, query } => {
            if items.is_empty() {
                return render_empty_state(*tab, query);
            }
            items.iter().fold(String::new(), |mut html, item| {
                html.push_str(&render_card(item));
                html
            })
        }
    }
}

/// Admin review list for pending submissions
pub fn render_pending_list(items: &[Item]) -> String {
    if items.is_empty() {
        return format!(r#"<div class="state state-empty">{}</div>"#, escape_html(NO_PENDING_MESSAGE));
    }

    let mut html = String::new();
    for item in items {
        let id = escape_html(&item.id);
        let _ = write!(
            html,
            r#"<div class="pending-item" id="item-{id}">
  <div class="pending-header">
    <h3>{name} <span class="pending-type">({kind})</span></h3>
    <span class="badge badge-pending">PENDING</span>
  </div>
  <p>{description}</p>
  <small><i class="fa-solid fa-user"></i> {contact} | <i class="fa-solid fa-calendar"></i> {date} | <i class="fa-solid fa-location-dot"></i> {location}</small>
  <div class="item-actions">
    <button type="button" class="btn btn-approve" data-id="{id}" data-decision="approve"><i class="fa-solid fa-check"></i> Approve</button>
    <button type="button" class="btn btn-deny" data-id="{id}" data-decision="deny"><i class="fa-solid fa-xmark"></i> Deny</button>
  </div>
</div>
"#,
            id = id,
            name = escape_html(&item.name),
            kind = item.status.label(),
            description = field_or_placeholder(&item.description),
            contact = field_or_placeholder(&item.contact),
            date = escape_html(&item.date),
            location = field_or_placeholder(&item.location),
        );
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;

    fn item(name: &str, contact: &str) -> Item {
        Item {
            id: "1".to_string(),
            status: ItemStatus::Found,
            approved: true,
            name: name.to_string(),
            location: "Gym".to_string(),
            description: "Left on the bleachers".to_string(),
            contact: contact.to_string(),
            date: "Sep 13, 2025".to_string(),
            timestamp: None,
            category: Category::Clothing,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_script_in_name_is_inert() {
        let html = render_card(&item("<script>alert(1)</script>", "a@b.org"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_contact_button_has_mailto() {
        let html = render_card(&item("Blue Jacket", "student@school.org"));
        assert!(html.contains(
            "data-mailto=\"mailto:student@school.org?subject=Lost%20%26%20Found%20Inquiry\""
        ));
    }

    #[test]
    fn test_contact_without_email_is_disabled() {
        let html = render_card(&item("Blue Jacket", ""));
        assert!(html.contains("disabled"));
        assert!(!html.contains("mailto:"));
    }

    #[test]
    fn test_missing_fields_render_placeholder() {
        let mut umbrella = item("Umbrella", "");
        umbrella.location = String::new();
        umbrella.description = String::new();

        let card = render_card(&umbrella);
        assert!(card.contains(&format!("<strong>Location:</strong> {}", NOT_SPECIFIED)));
        assert!(card.contains(&format!("<p>{}</p>", NOT_SPECIFIED)));

        let pending = render_pending_list(&[umbrella]);
        assert_eq!(pending.matches(NOT_SPECIFIED).count(), 3);
    }

    #[test]
    fn test_mailto_cannot_break_attribute() {
        let html = render_card(&item("Pen", "x\"onmouseover=\"alert(1)@a.org"));
        // quotes are percent-encoded inside the link
        assert!(!html.contains("onmouseover=\"alert"));
    }

    #[test]
    fn test_empty_state_messages() {
        assert_eq!(
            empty_state_message(ItemStatus::Found, ""),
            "No Found items have been reported yet."
        );
        assert_eq!(
            empty_state_message(ItemStatus::Lost, " calc "),
            "No Lost items match \"calc\"."
        );
        let html = render_empty_state(ItemStatus::Found, "<b>");
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_render_grid_states() {
        assert!(render_grid(&GridView::Loading).contains("state-loading"));
        assert!(render_grid(&GridView::Failed).contains(LOAD_ERROR_MESSAGE));

        let jacket = item("Blue Jacket", "a@b.org");
        let html = render_grid(&GridView::Items {
            items: vec![&jacket],
            tab: ItemStatus::Found,
            query: "",
        });
        assert_eq!(html.matches("class=\"card ").count(), 1);
    }

    #[test]
    fn test_pending_list() {
        assert!(render_pending_list(&[]).contains("all caught up"));

        let html = render_pending_list(&[item("Blue Jacket", "a@b.org")]);
        assert!(html.contains("PENDING"));
        assert!(html.contains("data-decision=\"approve\""));
        assert!(html.contains("data-decision=\"deny\""));
    }
}
