//! Outbound mail transport
//!
//! Notifications go out through an internal SMTP relay. Delivery is
//! best-effort: `send` reports success or failure and the dispatcher decides
//! what to log; nothing here retries.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// Mail transport seam. The production implementation talks SMTP; tests
/// record messages instead.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one HTML email. Returns true on success.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

/// SMTP mailer over an internal relay (no auth, no TLS).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .build();
        Self {
            transport,
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        let message = Message::builder()
            .from(match self.from.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    tracing::error!("Invalid sender address {}: {}", self.from, e);
                    return false;
                }
            })
            .to(match to.parse() {
                Ok(mbox) => mbox,
                Err(e) => {
                    tracing::error!("Invalid recipient address {}: {}", to, e);
                    return false;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string());

        let message = match message {
            Ok(m) => m,
            Err(e) => {
                tracing::error!("Failed to build email to {}: {}", to, e);
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::info!("Email envoyé à {} — {}", to, subject);
                true
            }
            Err(e) => {
                tracing::error!("Erreur envoi email à {}: {}", to, e);
                false
            }
        }
    }
}

/// One line of the reorder digest email.
#[derive(Debug, Clone)]
pub struct ReorderLine {
    pub name: String,
    pub part_number: String,
    pub on_hand: i32,
    pub quantity_to_order: i32,
}

/// French HTML bodies for each notification kind.
pub mod templates {
    use super::ReorderLine;

    fn wrap(title: &str, inner: &str) -> String {
        format!(
            r#"<html><body style="font-family: Arial, sans-serif; max-width: 600px; margin: auto;">
<h2 style="color: #333;">{title}</h2>
{inner}
<hr style="border:none; border-top:1px solid #eee; margin-top:30px;">
<p style="color:#999; font-size:12px;">Système de gestion d'inventaire</p>
</body></html>"#
        )
    }

    pub fn reorder_digest(username: &str, pieces: &[ReorderLine]) -> (String, String) {
        let mut rows = String::new();
        for p in pieces {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                p.name, p.part_number, p.on_hand, p.quantity_to_order
            ));
        }
        let inner = format!(
            r#"<p>Bonjour <strong>{username}</strong>,</p>
<p>Les pièces suivantes sont sous leur seuil minimum et doivent être commandées :</p>
<table border="1" cellpadding="6" cellspacing="0">
<tr><th>Pièce</th><th>Numéro</th><th>En inventaire</th><th>À commander</th></tr>
{rows}
</table>"#
        );
        (
            format!("Pièces à commander ({})", pieces.len()),
            wrap("Pièces à commander", &inner),
        )
    }

    pub fn approval_request(
        username: &str,
        piece_name: &str,
        piece_id: i32,
        requested_by: &str,
    ) -> (String, String) {
        let inner = format!(
            r#"<p>Bonjour <strong>{username}</strong>,</p>
<p><strong>{requested_by}</strong> a soumis la pièce <strong>{piece_name}</strong> (réf {piece_id})
pour approbation d'achat.</p>
<p>Connectez-vous pour approuver ou refuser cette demande.</p>"#
        );
        (
            format!("Demande d'approbation — {piece_name}"),
            wrap("Demande d'approbation", &inner),
        )
    }

    pub fn approval_result(
        username: &str,
        piece_name: &str,
        approved: bool,
        note: &str,
    ) -> (String, String) {
        let verdict = if approved { "approuvée" } else { "refusée" };
        let note_html = if note.is_empty() {
            String::new()
        } else {
            format!("<p>Note : <em>{note}</em></p>")
        };
        let inner = format!(
            r#"<p>Bonjour <strong>{username}</strong>,</p>
<p>La demande d'achat pour la pièce <strong>{piece_name}</strong> a été <strong>{verdict}</strong>.</p>
{note_html}"#
        );
        (
            format!("Demande {verdict} — {piece_name}"),
            wrap("Résultat d'approbation", &inner),
        )
    }

    pub fn order_placed(username: &str, piece_name: &str, qty: i32) -> (String, String) {
        let inner = format!(
            r#"<p>Bonjour <strong>{username}</strong>,</p>
<p>Une commande de <strong>{qty}</strong> unité(s) a été passée pour la pièce
<strong>{piece_name}</strong>.</p>"#
        );
        (
            format!("Pièce commandée — {piece_name}"),
            wrap("Pièce commandée", &inner),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_lists_each_piece() {
        let lines = vec![
            ReorderLine {
                name: "Roulement 6204".into(),
                part_number: "RLM-6204".into(),
                on_hand: 2,
                quantity_to_order: 3,
            },
            ReorderLine {
                name: "Courroie B42".into(),
                part_number: "CRB-42".into(),
                on_hand: 0,
                quantity_to_order: 10,
            },
        ];
        let (subject, body) = templates::reorder_digest("mgagnon", &lines);
        assert!(subject.contains("2"));
        assert!(body.contains("Roulement 6204"));
        assert!(body.contains("CRB-42"));
    }

    #[test]
    fn approval_result_mentions_verdict_and_note() {
        let (subject, body) = templates::approval_result("mgagnon", "Filtre HF35", false, "budget");
        assert!(subject.contains("refusée"));
        assert!(body.contains("budget"));

        let (_, body) = templates::approval_result("mgagnon", "Filtre HF35", true, "");
        assert!(body.contains("approuvée"));
        assert!(!body.contains("Note :"));
    }
}
