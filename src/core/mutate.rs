//! Document mutations
//!
//! Every operation takes the current document by reference and returns a new
//! one. Lookups that miss (unknown section id, out-of-range index, unknown
//! field name) return an unchanged copy, since the UI can race a removal
//! against a pending edit.

use std::time::{SystemTime, UNIX_EPOCH};

use super::model::{
    CustomAttr, CustomField, Document, FieldRef, Section, NEW_CUSTOM_LABEL, NEW_SECTION_TITLE,
};

/// Id for a section created at `now`, unique within `doc`
fn next_section_id(doc: &Document, now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let base = format!("section-{}", millis);

    if !doc.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !doc.contains(id))
        .unwrap_or(base)
}

/// Apply `edit` to a copy of the section with `id`
fn edit_section(doc: &Document, id: &str, edit: impl FnOnce(&mut Section)) -> Document {
    let Some(section) = doc.section(id) else {
        return doc.clone();
    };
    let mut section = section.clone();
    edit(&mut section);
    update_section(doc, id, section)
}

/// Append a new empty section. Returns the new document and the section id.
pub fn add_section(doc: &Document, now: SystemTime) -> (Document, String) {
    let id = next_section_id(doc, now);
    let mut next = doc.clone();
    next.sections.push(Section::generic(id.clone(), NEW_SECTION_TITLE));
    (next, id)
}

pub fn remove_section(doc: &Document, id: &str) -> Document {
    Document {
        sections: doc.sections.iter().filter(|s| s.id != id).cloned().collect(),
    }
}

/// Replace the section with `id` verbatim. The caller keeps the id intact.
pub fn update_section(doc: &Document, id: &str, section: Section) -> Document {
    let mut replacement = Some(section);
    Document {
        sections: doc
            .sections
            .iter()
            .map(|s| match replacement.take() {
                Some(new) if s.id == id => new,
                pending => {
                    replacement = pending;
                    s.clone()
                }
            })
            .collect(),
    }
}

/// Set the section image to a URL or a `data:` URL
pub fn set_section_image(doc: &Document, id: &str, image: &str) -> Document {
    edit_section(doc, id, |s| s.image = image.to_string())
}

pub fn set_section_title(doc: &Document, id: &str, title: &str) -> Document {
    edit_section(doc, id, |s| s.title = title.to_string())
}

/// Set a named scalar field
pub fn set_field(doc: &Document, section_id: &str, name: &str, value: &str) -> Document {
    let Some(section) = doc.section(section_id) else {
        return doc.clone();
    };
    let mut section = section.clone();
    if !section.fields.set(name, value.to_string()) {
        return doc.clone();
    }
    update_section(doc, section_id, section)
}

/// Clear a named scalar field, or remove one custom field by index
pub fn remove_field(doc: &Document, section_id: &str, field: &FieldRef) -> Document {
    match field {
        FieldRef::Named(name) => set_field(doc, section_id, name, ""),
        FieldRef::Custom(index) => edit_section(doc, section_id, |s| {
            let custom = s.fields.custom_mut();
            if *index < custom.len() {
                custom.remove(*index);
            }
        }),
    }
}

/// Append a placeholder custom field
pub fn add_custom_field(doc: &Document, section_id: &str) -> Document {
    edit_section(doc, section_id, |s| {
        s.fields
            .custom_mut()
            .push(CustomField::new(NEW_CUSTOM_LABEL, ""));
    })
}

/// Replace one attribute of the custom field at `index`
pub fn update_custom_field(
    doc: &Document,
    section_id: &str,
    index: usize,
    attr: CustomAttr,
    value: &str,
) -> Document {
    edit_section(doc, section_id, |s| {
        if let Some(entry) = s.fields.custom_mut().get_mut(index) {
            match attr {
                CustomAttr::Label => entry.label = value.to_string(),
                CustomAttr::Value => entry.value = value.to_string(),
            }
        }
    })
}
