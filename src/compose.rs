//! Outreach message bodies.
//!
//! The free-text slot of the template is chosen from four fixed Spanish
//! bodies according to the contact's tax-verification fields:
//!
//! | box 505 | tax id | validity date | support number | body |
//! |---|---|---|---|---|
//! | set | set | set | any | NIF + validity date |
//! | set | set | empty | set | NIE + support number |
//! | set | otherwise | | | ask for DNI/validity or NIE/support |
//! | empty | any | any | any | ask for box 505 |
//!
//! Placeholders `{nif}`, `{validity}`, `{support}` and `{box_505}` are
//! replaced with the trimmed record values.

use crate::models::ContactRecord;

/// The four message bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    pub nif_with_validity: String,
    pub nie_with_support: String,
    pub request_documents: String,
    pub missing_box_505: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            nif_with_validity: "porque tras intentar verificar tu perfil con la Agencia Tributaria, nos consta que alguno de los datos proporcionados no es correcto: \
                - NIF: {nif} - Fecha de validez: {validity} - Casilla 505: {box_505} \
                (Asegúrate por favor que la declaración sea del Ejercicio 2023)  Por favor verifica estos datos nuevamente. Quedamos a la espera, muchas gracias!"
                .to_string(),
            nie_with_support: "porque tras intentar verificar tu perfil con la Agencia Tributaria, nos consta que alguno de los datos proporcionados no es correcto: \
                - NIE: {nif} - Número de soporte: {support} - Casilla 505: {box_505} \
                (Asegúrate por favor que la declaración sea del Ejercicio 2023). Por favor verifica estos datos nuevamente. Quedamos a la espera, muchas gracias!"
                .to_string(),
            request_documents: "porque tras intentar verificar tu perfil con la Agencia Tributaria, nos consta que alguno de los datos proporcionados no es correcto. \
                Necesitamos que nos envíes tu DNI/Fecha de validez o NIE/Numero de soporte. Por favor verifica estos datos nuevamente. Quedamos a la espera, muchas gracias!"
                .to_string(),
            missing_box_505: "porque para poder revisar tus declaraciones de la renta pasadas, necesitamos adicionalmente \
                el valor de la casilla 505 del ejercicio 2023. Quedamos a la espera, muchas gracias!"
                .to_string(),
        }
    }
}

/// Which body a record gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKind {
    NifWithValidity,
    NieWithSupport,
    RequestDocuments,
    MissingBox505,
}

impl MessageKind {
    fn for_record(record: &ContactRecord) -> Self {
        let has = |value: &str| !value.trim().is_empty();

        if !has(&record.aeat_505) {
            MessageKind::MissingBox505
        } else if has(&record.nif) && has(&record.nif_expiricy) {
            MessageKind::NifWithValidity
        } else if has(&record.nif) && has(&record.nie_soporte) {
            MessageKind::NieWithSupport
        } else {
            MessageKind::RequestDocuments
        }
    }
}

impl MessageTemplates {
    /// Build the message body for a record.
    pub fn compose(&self, record: &ContactRecord) -> String {
        let template = match MessageKind::for_record(record) {
            MessageKind::NifWithValidity => &self.nif_with_validity,
            MessageKind::NieWithSupport => &self.nie_with_support,
            MessageKind::RequestDocuments => &self.request_documents,
            MessageKind::MissingBox505 => &self.missing_box_505,
        };

        fill(template, |name| match name {
            "nif" => Some(record.nif.trim()),
            "validity" => Some(record.nif_expiricy.trim()),
            "support" => Some(record.nie_soporte.trim()),
            "box_505" => Some(record.aeat_505.trim()),
            _ => None,
        })
    }
}

/// Replace `{name}` placeholders in one left-to-right pass.
///
/// Inserted values are never scanned again. Unknown names and unmatched
/// braces are copied through unchanged.
fn fill<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find('}').and_then(|end| {
            let name = &tail[1..=end];
            lookup(name).map(|value| (value, end + 2))
        }) {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Compose with the default templates.
pub fn compose(record: &ContactRecord) -> String {
    MessageTemplates::default().compose(record)
}
