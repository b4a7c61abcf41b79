//! Display tree for the page
//!
//! [`project`] turns the document and the admin gate into plain view values.
//! The egui painters only walk this tree and report actions back, so
//! everything decided here (which rows show, what becomes a link) is testable
//! without a UI context.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::core::admin::{AdminGate, AdminState};
use crate::core::model::{Document, ProfileField, ProfileFields, Section, SectionFields};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid URL pattern"));

/// Whether a value looks like `scheme://...`
pub fn is_url(value: &str) -> bool {
    URL_PATTERN.is_match(value)
}

/// The whole page
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub admin: AdminState,
    pub sections: Vec<SectionView>,
}

/// One section card
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    /// Image source, when one is set
    pub image: Option<String>,
    /// Whether edit affordances are shown
    pub editing: bool,
    pub body: SectionBody,
}

/// Body of a section card, by section kind
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    Profile {
        rows: Vec<FieldRow>,
        custom: Vec<CustomRow>,
    },
    /// Raw dump of an open field bag
    Generic { dump: String },
}

/// One scalar profile row
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub field: ProfileField,
    pub label: &'static str,
    pub value: String,
}

impl FieldRow {
    /// Text shown in view mode
    pub fn display_text(&self) -> String {
        match self.field.icon() {
            Some(icon) => format!("{} {}", icon, self.value),
            None => self.value.clone(),
        }
    }
}

/// One custom label/value row
#[derive(Debug, Clone, PartialEq)]
pub struct CustomRow {
    /// Position in the owning list
    pub index: usize,
    pub label: String,
    pub value: CustomValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    Link(String),
    Text(String),
}

impl CustomValue {
    fn classify(value: &str) -> Self {
        if is_url(value) {
            CustomValue::Link(value.to_string())
        } else {
            CustomValue::Text(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CustomValue::Link(s) | CustomValue::Text(s) => s,
        }
    }
}

/// Project the document for the current gate state
pub fn project(doc: &Document, gate: &AdminGate) -> PageView {
    let editing = gate.can_edit();
    PageView {
        admin: gate.state(),
        sections: doc
            .sections
            .iter()
            .map(|s| project_section(s, editing))
            .collect(),
    }
}

fn project_section(section: &Section, editing: bool) -> SectionView {
    let body = match &section.fields {
        SectionFields::Profile(fields) => profile_body(fields, editing),
        SectionFields::Generic(fields) => SectionBody::Generic {
            dump: serde_json::to_string(fields).unwrap_or_default(),
        },
    };

    SectionView {
        id: section.id.clone(),
        title: section.title.clone(),
        image: (!section.image.is_empty()).then(|| section.image.clone()),
        editing,
        body,
    }
}

fn profile_body(fields: &ProfileFields, editing: bool) -> SectionBody {
    // Empty rows stay visible while editing so they can be filled in again
    let rows = ProfileField::DISPLAY_ORDER
        .into_iter()
        .filter(|f| editing || !fields.get(*f).is_empty())
        .map(|field| FieldRow {
            field,
            label: field.label(),
            value: fields.get(field).to_string(),
        })
        .collect();

    let custom = fields
        .custom
        .iter()
        .enumerate()
        .map(|(index, c)| CustomRow {
            index,
            label: c.label.clone(),
            value: CustomValue::classify(&c.value),
        })
        .collect();

    SectionBody::Profile { rows, custom }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::admin::DEFAULT_SECRET;
    use crate::core::model::{CustomAttr, PROFILE_SECTION_ID};
    use crate::core::mutate;
    use crate::core::storage::MemoryStore;

    fn editing_gate() -> AdminGate {
        let mut store = MemoryStore::new();
        let mut gate = AdminGate::default();
        gate.login(&mut store, DEFAULT_SECRET).unwrap();
        gate
    }

    fn profile_body_of(page: &PageView) -> (&[FieldRow], &[CustomRow]) {
        match &page.sections[0].body {
            SectionBody::Profile { rows, custom } => (rows, custom),
            other => panic!("expected profile body, got {other:?}"),
        }
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://a"));
        assert!(is_url("ftp://files.example.com/x"));
        assert!(is_url("git+ssh://host/repo"));
        assert!(!is_url("example.com"));
        assert!(!is_url("mailto:a@b.c"));
        assert!(!is_url(" https://example.com"));
        assert!(!is_url("see https://example.com"));
    }

    #[test]
    fn test_view_mode_skips_empty_rows() {
        let page = project(&Document::first_run(), &AdminGate::default());
        assert_ne!(page.admin, AdminState::Editing);

        let (rows, custom) = profile_body_of(&page);
        let fields: Vec<_> = rows.iter().map(|r| r.field).collect();
        assert_eq!(fields, vec![ProfileField::Name, ProfileField::Title]);
        assert_eq!(rows[0].display_text(), "Xinbad");
        assert!(custom.is_empty());
        assert!(!page.sections[0].editing);
        assert_eq!(page.sections[0].image, None);
    }

    #[test]
    fn test_editing_mode_shows_every_row() {
        let page = project(&Document::first_run(), &editing_gate());
        assert_eq!(page.admin, AdminState::Editing);

        let (rows, _) = profile_body_of(&page);
        let fields: Vec<_> = rows.iter().map(|r| r.field).collect();
        assert_eq!(fields, ProfileField::DISPLAY_ORDER.to_vec());
        assert!(page.sections[0].editing);
    }

    #[test]
    fn test_icons_prefix_contact_rows() {
        let doc = mutate::set_field(&Document::first_run(), PROFILE_SECTION_ID, "email", "a@b.c");
        let page = project(&doc, &AdminGate::default());
        let (rows, _) = profile_body_of(&page);
        let email = rows.iter().find(|r| r.field == ProfileField::Email).unwrap();
        assert_eq!(email.display_text(), "📧 a@b.c");
    }

    #[test]
    fn test_custom_url_renders_as_link() {
        let doc = Document::first_run();
        let doc = mutate::add_custom_field(&doc, PROFILE_SECTION_ID);
        let doc = mutate::add_custom_field(&doc, PROFILE_SECTION_ID);
        let doc = mutate::update_custom_field(&doc, PROFILE_SECTION_ID, 0, CustomAttr::Value, "https://github.com/x");
        let doc = mutate::update_custom_field(&doc, PROFILE_SECTION_ID, 1, CustomAttr::Value, "just text");

        let page = project(&doc, &AdminGate::default());
        let (_, custom) = profile_body_of(&page);
        assert_eq!(custom[0].value, CustomValue::Link("https://github.com/x".to_string()));
        assert_eq!(custom[1].value, CustomValue::Text("just text".to_string()));
        assert_eq!(custom[1].index, 1);
    }

    #[test]
    fn test_generic_section_dumps_fields() {
        let (doc, id) = mutate::add_section(&Document::first_run(), std::time::UNIX_EPOCH);
        let doc = mutate::set_field(&doc, &id, "motto", "hi");
        let doc = mutate::set_section_image(&doc, &id, "https://example.com/a.png");

        let page = project(&doc, &AdminGate::default());
        let section = &page.sections[1];
        assert_eq!(section.id, id);
        assert_eq!(section.image.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            section.body,
            SectionBody::Generic {
                dump: r#"{"custom":[],"motto":"hi"}"#.to_string()
            }
        );
    }

    #[test]
    fn test_viewing_while_logged_in_has_no_affordances() {
        let mut gate = editing_gate();
        gate.toggle_editing();
        let page = project(&Document::first_run(), &gate);
        assert_eq!(page.admin, AdminState::Viewing);
        assert!(page.sections.iter().all(|s| !s.editing));
    }
}
