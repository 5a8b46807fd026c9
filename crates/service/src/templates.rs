//! Fixed HTML wrappers for outgoing mail.

/// Subject line of the failure alert sent to the admin address.
pub const ADMIN_ALERT_SUBJECT: &str = "⚠️ Failed Email Notification";

/// Invisible 1x1 image appended to every queued body.
#[must_use]
pub fn tracking_pixel_tag(pixel_url: &str) -> String {
    format!(r#"<img src="{pixel_url}" width="1" height="1" style="display:none" />"#)
}

/// Wraps a queued body in the notification layout used for delivery.
#[must_use]
pub fn delivery_html(recipient: &str, body_html: &str) -> String {
    format!(
        "<div style='font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px; border-radius: 8px;'>\
         <h2 style='color: #4CAF50;'>📧 Email Notification</h2>\
         <p><strong>To:</strong> {recipient}</p>\
         <p style='font-size: 16px; color: #333;'>{body_html}</p>\
         <hr />\
         <p style='font-size: 12px; color: #888;'>This is an automated message.</p>\
         </div>",
        recipient = escape_html(recipient),
    )
}

/// Alert body naming the failed recipient and the recorded reason.
#[must_use]
pub fn admin_alert_html(failed_recipient: &str, reason: &str) -> String {
    format!(
        "<div style='font-family: Arial, sans-serif; background-color: #f4f4f4; padding: 20px; border-radius: 8px;'>\
         <h2 style='color: #F44336;'>❌ Failed Email Notification</h2>\
         <p><strong>Failed To:</strong> {recipient}</p>\
         <p><strong>Reason:</strong> {reason}</p>\
         <p style='font-size: 12px; color: #888;'>This is an automated notification to admin.</p>\
         </div>",
        recipient = escape_html(failed_recipient),
        reason = escape_html(reason),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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
