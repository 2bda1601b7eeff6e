//! The catalog of email-bearing metadata fields.
//!
//! Metadata keys on application records double as their display labels, so
//! the same strings are used to query the store, read values, and name the
//! exported fields.

/// A metadata key that may hold an email address, plus the keys whose values
/// are exported alongside it when it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub primary: &'static str,
    pub associated: &'static [&'static str],
}

/// An immutable, ordered list of [`FieldDefinition`]s.
///
/// Iteration order is definition order, which is also the order matches are
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: &'static [FieldDefinition],
}

impl FieldCatalog {
    pub const fn new(fields: &'static [FieldDefinition]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldDefinition] {
        self.fields
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|field| field.primary)
    }

    pub fn get(&self, primary: &str) -> Option<&'static FieldDefinition> {
        self.fields.iter().find(|field| field.primary == primary)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        EMAIL_FIELDS
    }
}

macro_rules! wrangler {
    ($role:literal) => {
        FieldDefinition {
            primary: concat!($role, " Wrangler E-mail Address"),
            associated: &[concat!($role, " Wrangler Name")],
        }
    };
}

const WORDCAMP_FIELDS: &[FieldDefinition] = &[
    FieldDefinition {
        primary: "Email Address",
        associated: &["Organizer Name", "WordPress.org Username", "Telephone", "Mailing Address"],
    },
    wrangler!("Sponsor"),
    wrangler!("Budget"),
    wrangler!("Venue"),
    wrangler!("Speaker"),
    wrangler!("Food/Beverage"),
    wrangler!("Swag"),
    wrangler!("Volunteer"),
    wrangler!("Printing"),
    wrangler!("Design"),
    wrangler!("Website"),
    wrangler!("Social Media/Publicity"),
    wrangler!("A/V"),
    wrangler!("Party"),
    wrangler!("Travel"),
    wrangler!("Safety"),
    FieldDefinition {
        primary: "Mentor E-mail Address",
        associated: &["Mentor WordPress.org User Name", "Mentor Name"],
    },
];

/// Email-bearing fields of a WordCamp application record.
pub const EMAIL_FIELDS: FieldCatalog = FieldCatalog::new(WORDCAMP_FIELDS);

/// The field catalog used by the exporter.
pub fn email_postmeta_keys() -> FieldCatalog {
    EMAIL_FIELDS
}
