//! Profile document model
//!
//! A document is an ordered list of sections. One section kind carries the
//! fixed profile schema; every other section carries an open field bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Id of the profile section created on first run
pub const PROFILE_SECTION_ID: &str = "profile";
/// Title of the first-run profile section
pub const DEFAULT_PROFILE_TITLE: &str = "โปรไฟล์";
/// Placeholder title for a freshly added section
pub const NEW_SECTION_TITLE: &str = "หัวข้อใหม่";
/// Placeholder label for a freshly added custom field
pub const NEW_CUSTOM_LABEL: &str = "ใหม่";

/// The persisted top-level object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Sections in insertion (and display) order
    pub sections: Vec<Section>,
}

impl Document {
    /// The document used when nothing usable is stored
    pub fn first_run() -> Self {
        let fields = ProfileFields {
            name: "Xinbad".to_string(),
            title: "ตำแหน่ง/บทบาท".to_string(),
            ..ProfileFields::default()
        };

        Self {
            sections: vec![Section {
                id: PROFILE_SECTION_ID.to_string(),
                title: DEFAULT_PROFILE_TITLE.to_string(),
                image: String::new(),
                fields: SectionFields::Profile(fields),
            }],
        }
    }

    /// Find a section by id
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Whether a section with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.section(id).is_some()
    }
}

/// Section type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Profile,
    Generic,
}

/// One card on the page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSection")]
pub struct Section {
    /// Immutable identity
    pub id: String,
    pub title: String,
    /// Empty, a URL, or a `data:` URL
    pub image: String,
    pub fields: SectionFields,
}

impl Section {
    /// Create an empty generic section
    pub fn generic(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: String::new(),
            fields: SectionFields::Generic(GenericFields::default()),
        }
    }

    pub fn kind(&self) -> SectionKind {
        match self.fields {
            SectionFields::Profile(_) => SectionKind::Profile,
            SectionFields::Generic(_) => SectionKind::Generic,
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            id: &'a str,
            title: &'a str,
            image: &'a str,
            kind: SectionKind,
            fields: &'a SectionFields,
        }

        Wire {
            id: &self.id,
            title: &self.title,
            image: &self.image,
            kind: self.kind(),
            fields: &self.fields,
        }
        .serialize(serializer)
    }
}

/// Stored shape of a section, tolerant of the layout written before the
/// `kind` tag existed.
#[derive(Deserialize)]
struct RawSection {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    kind: Option<SectionKind>,
    #[serde(default)]
    fields: Value,
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        // Untagged sections predate the kind tag: the profile was found by id.
        let kind = raw.kind.unwrap_or(if raw.id == PROFILE_SECTION_ID {
            SectionKind::Profile
        } else {
            SectionKind::Generic
        });

        let fields = match kind {
            SectionKind::Profile => SectionFields::Profile(ProfileFields::from_value(raw.fields)),
            SectionKind::Generic => SectionFields::Generic(GenericFields::from_value(raw.fields)),
        };

        Self {
            id: raw.id,
            title: raw.title,
            image: raw.image,
            fields,
        }
    }
}

/// Field set of a section, selected by its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionFields {
    Profile(ProfileFields),
    Generic(GenericFields),
}

impl SectionFields {
    pub fn custom(&self) -> &[CustomField] {
        match self {
            SectionFields::Profile(f) => &f.custom,
            SectionFields::Generic(f) => &f.custom,
        }
    }

    pub fn custom_mut(&mut self) -> &mut Vec<CustomField> {
        match self {
            SectionFields::Profile(f) => &mut f.custom,
            SectionFields::Generic(f) => &mut f.custom,
        }
    }

    /// Set a named scalar field. Returns false when the name does not exist
    /// in this field set's schema.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        match self {
            SectionFields::Profile(f) => match ProfileField::from_key(name) {
                Some(field) => {
                    *f.get_mut(field) = value;
                    true
                }
                None => false,
            },
            // `custom` is the list, never a scalar
            SectionFields::Generic(_) if name == "custom" => false,
            SectionFields::Generic(f) => {
                f.entries.insert(name.to_string(), value);
                true
            }
        }
    }

    /// Read a named scalar field
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            SectionFields::Profile(f) => ProfileField::from_key(name).map(|field| f.get(field)),
            SectionFields::Generic(f) => f.entries.get(name).map(String::as_str),
        }
    }
}

/// The fixed profile schema
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub name: String,
    pub title: String,
    pub tagline: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub about: String,
    pub custom: Vec<CustomField>,
}

impl ProfileFields {
    /// Build from a stored JSON value. Unknown keys and nested values are
    /// dropped; scalars of any type are kept as strings.
    fn from_value(value: Value) -> Self {
        let mut fields = Self::default();
        let Some(map) = field_map(value) else {
            return fields;
        };

        for (key, value) in map {
            if key == "custom" {
                fields.custom = custom_from_value(value);
                continue;
            }
            let Some(field) = ProfileField::from_key(&key) else {
                tracing::debug!("Ignoring unknown profile field '{}'", key);
                continue;
            };
            match scalar_string(value) {
                Some(text) => *fields.get_mut(field) = text,
                None => tracing::warn!("Dropping nested profile field '{}'", key),
            }
        }
        fields
    }

    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Title => &self.title,
            ProfileField::Tagline => &self.tagline,
            ProfileField::About => &self.about,
            ProfileField::Location => &self.location,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
        }
    }

    pub fn get_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Title => &mut self.title,
            ProfileField::Tagline => &mut self.tagline,
            ProfileField::About => &mut self.about,
            ProfileField::Location => &mut self.location,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
        }
    }
}

/// Scalar fields of the profile schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Title,
    Tagline,
    About,
    Location,
    Email,
    Phone,
}

impl ProfileField {
    /// Order in which the profile card shows its rows
    pub const DISPLAY_ORDER: [ProfileField; 7] = [
        ProfileField::Name,
        ProfileField::Title,
        ProfileField::Tagline,
        ProfileField::About,
        ProfileField::Location,
        ProfileField::Email,
        ProfileField::Phone,
    ];

    /// Key used in the stored field bag
    pub fn key(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Title => "title",
            ProfileField::Tagline => "tagline",
            ProfileField::About => "about",
            ProfileField::Location => "location",
            ProfileField::Email => "email",
            ProfileField::Phone => "phone",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::DISPLAY_ORDER.into_iter().find(|f| f.key() == key)
    }

    /// Human label shown next to editable inputs
    pub fn label(self) -> &'static str {
        match self {
            ProfileField::Name => "ชื่อ",
            ProfileField::Title => "ตำแหน่ง",
            ProfileField::Tagline => "คำโปรย",
            ProfileField::About => "เกี่ยวกับ",
            ProfileField::Location => "ที่อยู่",
            ProfileField::Email => "อีเมล",
            ProfileField::Phone => "โทรศัพท์",
        }
    }

    /// Prefix shown before the value in view mode
    pub fn icon(self) -> Option<&'static str> {
        match self {
            ProfileField::Location => Some("📍"),
            ProfileField::Email => Some("📧"),
            ProfileField::Phone => Some("📞"),
            _ => None,
        }
    }
}

/// Open field bag of a non-profile section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GenericFields {
    pub custom: Vec<CustomField>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, String>,
}

impl GenericFields {
    /// Build from a stored JSON value. Scalars are kept as strings; nested
    /// values other than `custom` are dropped.
    fn from_value(value: Value) -> Self {
        let mut fields = Self::default();
        let Some(map) = field_map(value) else {
            return fields;
        };

        for (key, value) in map {
            if key == "custom" {
                fields.custom = custom_from_value(value);
                continue;
            }
            match scalar_string(value) {
                Some(text) => {
                    fields.entries.insert(key, text);
                }
                None => tracing::warn!("Dropping nested field '{}'", key),
            }
        }
        fields
    }
}

/// The object behind a stored field bag, `None` when there is nothing usable
fn field_map(value: Value) -> Option<serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            tracing::warn!("Ignoring non-object field bag: {}", other);
            None
        }
    }
}

/// String form of a stored scalar. Null reads as empty; nested values have none.
fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => Some(String::new()),
        v @ (Value::Bool(_) | Value::Number(_)) => Some(v.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Custom entries from a stored list. A missing or malformed list is empty
/// and entries that are not objects are dropped.
fn custom_from_value(value: Value) -> Vec<CustomField> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!("Dropping malformed custom list: {}", other);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| {
            let mut entry = match item {
                Value::Object(entry) => entry,
                other => {
                    tracing::warn!("Dropping malformed custom entry: {}", other);
                    return None;
                }
            };
            let mut attr = |name: &str| {
                entry
                    .remove(name)
                    .and_then(scalar_string)
                    .unwrap_or_default()
            };
            let label = attr("label");
            let value = attr("value");
            Some(CustomField { label, value })
        })
        .collect()
}

/// A user-defined label/value pair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    pub label: String,
    pub value: String,
}

impl CustomField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Which attribute of a custom field to update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomAttr {
    Label,
    Value,
}

/// Address of a field inside a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// A named scalar field
    Named(String),
    /// A custom field by position
    Custom(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_run_document() {
        let doc = Document::first_run();
        assert_eq!(doc.sections.len(), 1);

        let section = &doc.sections[0];
        assert_eq!(section.id, "profile");
        assert_eq!(section.title, "โปรไฟล์");
        assert_eq!(section.image, "");
        assert_eq!(section.kind(), SectionKind::Profile);
        assert_eq!(section.fields.get("name"), Some("Xinbad"));
        assert_eq!(section.fields.get("title"), Some("ตำแหน่ง/บทบาท"));
        assert_eq!(section.fields.get("about"), Some(""));
        assert!(section.fields.custom().is_empty());
    }

    #[test]
    fn test_section_wire_layout() {
        let json = serde_json::to_value(Document::first_run()).unwrap();
        let section = &json["sections"][0];
        assert_eq!(section["id"], "profile");
        assert_eq!(section["kind"], "profile");
        assert_eq!(section["fields"]["name"], "Xinbad");
        assert_eq!(section["fields"]["custom"], json!([]));

        let generic = serde_json::to_value(Section::generic("section-1", "x")).unwrap();
        assert_eq!(generic["kind"], "generic");
        assert_eq!(generic["fields"], json!({ "custom": [] }));
    }

    #[test]
    fn test_legacy_sections_without_kind() {
        let stored = json!({
            "sections": [
                {
                    "id": "profile",
                    "title": "โปรไฟล์",
                    "image": "",
                    "fields": { "name": "A", "custom": [{ "label": "web", "value": "https://a.b" }] }
                },
                {
                    "id": "section-1700000000000",
                    "title": "หัวข้อใหม่",
                    "image": "",
                    "fields": { "custom": [], "year": 2024, "nested": { "a": 1 } }
                }
            ]
        });

        let doc: Document = serde_json::from_value(stored).unwrap();
        assert_eq!(doc.sections[0].kind(), SectionKind::Profile);
        assert_eq!(doc.sections[0].fields.get("name"), Some("A"));
        assert_eq!(doc.sections[0].fields.custom()[0].value, "https://a.b");

        let generic = &doc.sections[1];
        assert_eq!(generic.kind(), SectionKind::Generic);
        assert_eq!(generic.fields.get("year"), Some("2024"));
        assert_eq!(generic.fields.get("nested"), None);
    }

    #[test]
    fn test_legacy_profile_with_loose_values() {
        let stored = json!({
            "id": "profile",
            "title": "Me",
            "image": "",
            "fields": { "name": "Ann", "phone": 812345678, "about": null, "custom": null }
        });
        let section: Section = serde_json::from_value(stored).unwrap();
        assert_eq!(section.title, "Me");
        assert_eq!(section.fields.get("name"), Some("Ann"));
        assert_eq!(section.fields.get("phone"), Some("812345678"));
        assert_eq!(section.fields.get("about"), Some(""));
        assert!(section.fields.custom().is_empty());

        let stored = json!({
            "id": "profile",
            "title": "Me",
            "fields": {
                "name": "Ann",
                "custom": [
                    { "label": "age", "value": 30 },
                    "junk",
                    { "label": null, "value": true },
                    { "value": "https://a.b" }
                ]
            }
        });
        let section: Section = serde_json::from_value(stored).unwrap();
        assert_eq!(
            section.fields.custom(),
            &[
                CustomField::new("age", "30"),
                CustomField::new("", "true"),
                CustomField::new("", "https://a.b"),
            ]
        );
    }

    #[test]
    fn test_malformed_custom_list_in_generic_section() {
        let stored = json!({ "id": "section-1", "title": "t", "fields": { "custom": { "a": 1 }, "k": "v" } });
        let section: Section = serde_json::from_value(stored).unwrap();
        assert!(section.fields.custom().is_empty());
        assert_eq!(section.fields.get("k"), Some("v"));
    }

    #[test]
    fn test_kind_tag_wins_over_id() {
        let stored = json!({ "id": "profile", "title": "t", "kind": "generic", "fields": { "k": "v" } });
        let section: Section = serde_json::from_value(stored).unwrap();
        assert_eq!(section.kind(), SectionKind::Generic);
        assert_eq!(section.fields.get("k"), Some("v"));
    }

    #[test]
    fn test_profile_rejects_unknown_scalar() {
        let mut fields = SectionFields::Profile(ProfileFields::default());
        assert!(!fields.set("nickname", "x".to_string()));
        assert!(fields.set("email", "a@b.c".to_string()));
        assert_eq!(fields.get("email"), Some("a@b.c"));
    }

    #[test]
    fn test_document_roundtrip_through_json() {
        let mut doc = Document::first_run();
        doc.sections.push(Section::generic("section-2", "Links"));
        let text = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }
}
