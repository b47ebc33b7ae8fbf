//! Contact record: one row of the exported flat file.

use super::crm::CrmProperty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column order of the flat file, also used as the CRM property projection.
pub const CONTACT_FIELDS: [&str; 12] = [
    "hs_object_id",
    "firstname",
    "lastname",
    "email",
    "phone",
    "nif",
    "nif_expiricy",
    "nie_soporte",
    "aeat_505",
    "iban_digits",
    "date_of_birth",
    "aeat_reference",
];

/// A contact exported from the CRM.
///
/// Every value is text and may be empty. Columns missing from a source file
/// deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRecord {
    pub hs_object_id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,

    /// NIF or NIE tax identifier
    pub nif: String,

    /// Tax-id validity date; a millisecond epoch in the export, `YYYY-MM-DD` after normalization
    pub nif_expiricy: String,

    /// NIE support number
    pub nie_soporte: String,

    /// Box 505 of the tax return; empty when the customer never provided it
    pub aeat_505: String,

    pub iban_digits: String,
    pub date_of_birth: String,

    /// Reference-error marker set by the verification job
    pub aeat_reference: String,
}

impl ContactRecord {
    /// Flatten a CRM property list into the fixed column set.
    ///
    /// Properties outside [`CONTACT_FIELDS`] are ignored; absent or null
    /// properties become empty strings. When a name repeats, the last value wins.
    pub fn from_properties(properties: &[CrmProperty]) -> Self {
        let values: HashMap<&str, &str> = properties
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_deref().unwrap_or("")))
            .collect();
        let get = |name: &str| values.get(name).copied().unwrap_or("").to_string();

        ContactRecord {
            hs_object_id: get("hs_object_id"),
            firstname: get("firstname"),
            lastname: get("lastname"),
            email: get("email"),
            phone: get("phone"),
            nif: get("nif"),
            nif_expiricy: get("nif_expiricy"),
            nie_soporte: get("nie_soporte"),
            aeat_505: get("aeat_505"),
            iban_digits: get("iban_digits"),
            date_of_birth: get("date_of_birth"),
            aeat_reference: get("aeat_reference"),
        }
    }

    /// Values in [`CONTACT_FIELDS`] order.
    pub fn to_row(&self) -> [&str; 12] {
        [
            &self.hs_object_id,
            &self.firstname,
            &self.lastname,
            &self.email,
            &self.phone,
            &self.nif,
            &self.nif_expiricy,
            &self.nie_soporte,
            &self.aeat_505,
            &self.iban_digits,
            &self.date_of_birth,
            &self.aeat_reference,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, value: Option<&str>) -> CrmProperty {
        CrmProperty {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }

    #[test]
    fn test_from_properties_fills_known_columns() {
        let record = ContactRecord::from_properties(&[
            prop("hs_object_id", Some("101")),
            prop("firstname", Some("Lucía")),
            prop("phone", Some("+34600123456")),
            prop("nif", Some("12345678Z")),
        ]);

        assert_eq!(record.hs_object_id, "101");
        assert_eq!(record.firstname, "Lucía");
        assert_eq!(record.phone, "+34600123456");
        assert_eq!(record.nif, "12345678Z");
        assert_eq!(record.lastname, "");
        assert_eq!(record.aeat_505, "");
    }

    #[test]
    fn test_from_properties_null_and_unknown() {
        let record = ContactRecord::from_properties(&[
            prop("email", None),
            prop("favourite_colour", Some("green")),
        ]);
        assert_eq!(record, ContactRecord::default());
    }

    #[test]
    fn test_from_properties_last_value_wins() {
        let record = ContactRecord::from_properties(&[
            prop("firstname", Some("Ana")),
            prop("firstname", Some("Eva")),
        ]);
        assert_eq!(record.firstname, "Eva");
    }

    #[test]
    fn test_to_row_matches_field_order() {
        let record = ContactRecord {
            hs_object_id: "1".to_string(),
            aeat_reference: "ERROR".to_string(),
            ..ContactRecord::default()
        };
        let row = record.to_row();
        assert_eq!(row.len(), CONTACT_FIELDS.len());
        assert_eq!(row[0], "1");
        assert_eq!(row[11], "ERROR");
        assert_eq!(CONTACT_FIELDS[11], "aeat_reference");
    }
}
