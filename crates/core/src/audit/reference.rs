//! Journal entry `reference` links.
//!
//! Entries point at the business record that produced them through a
//! free-text `reference` of the form `"<kind>:<id>"`. The link is not a
//! foreign key, so it is parsed once at the read boundary and compared as
//! a typed value afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of business record a journal entry can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// `invoice:<id>`
    Invoice,
    /// `payment:<id>`
    Payment,
}

impl EntityKind {
    /// The `reference` prefix, separator included.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Invoice => "invoice:",
            Self::Payment => "payment:",
        }
    }
}

/// A parsed `reference` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Record kind.
    pub kind: EntityKind,
    /// Record ID.
    pub id: Uuid,
}

impl EntityRef {
    /// Creates a new link.
    #[must_use]
    pub const fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    /// Parses a raw `reference` column. Anything that is not a recognised
    /// `"<kind>:<uuid>"` link (opening-balance tags, free notes) is `None`.
    #[must_use]
    pub fn parse(reference: Option<&str>) -> Option<Self> {
        reference.and_then(|raw| raw.parse().ok())
    }
}

impl FromStr for EntityRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, rest) = [EntityKind::Invoice, EntityKind::Payment]
            .into_iter()
            .find_map(|kind| s.strip_prefix(kind.prefix()).map(|rest| (kind, rest)))
            .ok_or_else(|| format!("Not an entity reference: {s}"))?;

        let id = Uuid::parse_str(rest.trim()).map_err(|e| format!("Bad entity id in {s}: {e}"))?;
        Ok(Self { kind, id })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_invoice_and_payment_links() {
        let id = Uuid::new_v4();
        assert_eq!(
            EntityRef::parse(Some(&format!("invoice:{id}"))),
            Some(EntityRef::new(EntityKind::Invoice, id))
        );
        assert_eq!(
            EntityRef::parse(Some(&format!("payment: {id}"))),
            Some(EntityRef::new(EntityKind::Payment, id))
        );
    }

    #[test]
    fn test_ignores_other_references() {
        assert_eq!(EntityRef::parse(None), None);
        assert_eq!(EntityRef::parse(Some("OB-2025")), None);
        assert_eq!(EntityRef::parse(Some("invoice:not-a-uuid")), None);
        assert_eq!(EntityRef::parse(Some("bill:123")), None);
    }

    #[test]
    fn test_display_round_trips_the_stored_form() {
        let link = EntityRef::new(EntityKind::Payment, Uuid::new_v4());
        assert_eq!(link.to_string().parse::<EntityRef>().unwrap(), link);
        assert!(link.to_string().starts_with("payment:"));
    }
}
