//! HTML email body rendering and SMTP relay for weekly reports.
//!
//! The transport is built per request from caller-supplied credentials; the
//! service holds no mail configuration of its own.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use super::ScoreRow;

/// Failures on the way to the relay. Address and message-build problems are
/// caller mistakes; transport failures come from the remote SMTP server.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid sender address: {0}")]
    SenderAddress(lettre::address::AddressError),
    #[error("invalid recipient address: {0}")]
    RecipientAddress(lettre::address::AddressError),
    #[error(transparent)]
    Message(#[from] lettre::error::Error),
    #[error(transparent)]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Caller-supplied SMTP relay settings.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
}

/// Render the report as an HTML table body.
pub fn render_html(week: &str, rows: &[ScoreRow]) -> String {
    let mut body = String::new();
    body.push_str("<html>\n<body>\n");
    body.push_str(&format!("<h2>Weekly Productivity Report - {week}</h2>\n"));
    body.push_str("<p>Please find the weekly productivity report attached.</p>\n<br>\n");
    body.push_str("<table border=\"1\" cellpadding=\"5\">\n");
    body.push_str("<tr style=\"background-color: #4472C4; color: white;\">\n");
    for header in ["Employee", "Task", "Speed", "Professional", "Activity", "Score"] {
        body.push_str(&format!("  <th>{header}</th>\n"));
    }
    body.push_str("</tr>\n");
    for row in rows {
        body.push_str("<tr>\n");
        body.push_str(&format!("  <td>{}</td>\n", row.employee_name));
        body.push_str(&format!("  <td>{}</td>\n", row.task_completion));
        body.push_str(&format!("  <td>{}</td>\n", row.speed));
        body.push_str(&format!("  <td>{}</td>\n", row.professionalism));
        body.push_str(&format!("  <td>{}</td>\n", row.activity));
        body.push_str(&format!("  <td><b>{}</b></td>\n", row.productivity_score));
        body.push_str("</tr>\n");
    }
    body.push_str("</table>\n<br>\n");
    body.push_str("<p>Best regards,<br>Productivity Tracker System</p>\n");
    body.push_str("</body>\n</html>\n");
    body
}

/// Relay the rendered report over STARTTLS. Blocking; callers on the async
/// runtime should run this on a blocking worker.
pub fn send_report(settings: &MailSettings, recipient: &str, week: &str, html: String) -> Result<(), MailError> {
    let from: Mailbox = settings.sender_email.parse().map_err(MailError::SenderAddress)?;
    let to: Mailbox = recipient.parse().map_err(MailError::RecipientAddress)?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(format!("Weekly Productivity Report - {week}"))
        .header(ContentType::TEXT_HTML)
        .body(html)?;

    let mailer = SmtpTransport::starttls_relay(&settings.smtp_server)?
        .port(settings.smtp_port)
        .credentials(Credentials::new(
            settings.sender_email.clone(),
            settings.sender_password.clone(),
        ))
        .build();

    mailer.send(&message)?;
    Ok(())
}
