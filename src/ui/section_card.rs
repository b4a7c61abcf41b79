//! Section card rendering
//!
//! Paints one [`SectionView`] and reports what the user did as
//! [`SectionAction`] values. The card never touches the document itself.

use std::collections::HashMap;

use eframe::egui::{self, Color32, RichText, Ui};

use super::images::{show_image, ImageCache};
use super::view_model::{CustomRow, CustomValue, FieldRow, SectionBody, SectionView};
use crate::core::model::{CustomAttr, FieldRef, ProfileField};

/// Something the user asked for on a section card
#[derive(Debug, Clone, PartialEq)]
pub enum SectionAction {
    SetTitle { id: String, title: String },
    SetImageUrl { id: String, url: String },
    ClearImage { id: String },
    PickImage { id: String },
    Remove { id: String },
    SetField { id: String, field: ProfileField, value: String },
    ClearField { id: String, field: FieldRef },
    AddCustomField { id: String },
    UpdateCustomField { id: String, index: usize, attr: CustomAttr, value: String },
    /// Open an external URL
    OpenUrl(String),
}

/// Card painter for a single section
pub struct SectionCard;

impl SectionCard {
    /// Show a section card. `url_drafts` holds the image-URL inputs, which
    /// are only applied when they lose focus.
    pub fn show(
        ui: &mut Ui,
        section: &SectionView,
        url_drafts: &mut HashMap<String, String>,
        images: &mut ImageCache,
    ) -> Vec<SectionAction> {
        let mut actions = Vec::new();

        ui.push_id(&section.id, |ui| {
            egui::Frame::group(ui.style())
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    Self::show_header(ui, section, url_drafts, &mut actions);
                    ui.add_space(6.0);

                    if let Some(image) = &section.image {
                        match images.source(&section.id, image) {
                            Some(source) => show_image(ui, source),
                            None => {
                                ui.label(RichText::new("(รูปภาพเสียหาย)").weak());
                            }
                        }
                        ui.add_space(6.0);
                    }

                    match &section.body {
                        SectionBody::Profile { rows, custom } => {
                            Self::show_profile(ui, section, rows, custom, &mut actions);
                        }
                        SectionBody::Generic { dump } => {
                            ui.label(RichText::new(dump).monospace().weak());
                        }
                    }
                });
        });

        actions
    }

    fn show_header(
        ui: &mut Ui,
        section: &SectionView,
        url_drafts: &mut HashMap<String, String>,
        actions: &mut Vec<SectionAction>,
    ) {
        let id = &section.id;

        if !section.editing {
            ui.heading(&section.title);
            return;
        }

        ui.horizontal(|ui| {
            let mut title = section.title.clone();
            if ui.text_edit_singleline(&mut title).changed() {
                actions.push(SectionAction::SetTitle {
                    id: id.clone(),
                    title,
                });
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let remove = egui::Button::new(RichText::new("ลบหัวข้อ").color(Color32::WHITE))
                    .fill(Color32::from_rgb(200, 60, 60));
                if ui.add(remove).clicked() {
                    actions.push(SectionAction::Remove { id: id.clone() });
                }
            });
        });

        ui.horizontal(|ui| {
            if ui.button("🖼").on_hover_text("เลือกรูปภาพ").clicked() {
                actions.push(SectionAction::PickImage { id: id.clone() });
            }

            let draft = url_drafts.entry(id.clone()).or_default();
            let response = ui.add(
                egui::TextEdit::singleline(draft)
                    .hint_text("ใส่ลิงก์รูปภาพ")
                    .desired_width(280.0),
            );
            if response.lost_focus() && !draft.trim().is_empty() {
                actions.push(SectionAction::SetImageUrl {
                    id: id.clone(),
                    url: draft.trim().to_string(),
                });
                draft.clear();
            }

            if section.image.is_some() && ui.button("ลบรูป").clicked() {
                actions.push(SectionAction::ClearImage { id: id.clone() });
            }
        });
    }

    fn show_profile(
        ui: &mut Ui,
        section: &SectionView,
        rows: &[FieldRow],
        custom: &[CustomRow],
        actions: &mut Vec<SectionAction>,
    ) {
        let id = &section.id;

        ui.vertical(|ui| {
            for row in rows {
                if section.editing {
                    Self::edit_field_row(ui, id, row, actions);
                } else {
                    Self::view_field_row(ui, row);
                }
            }

            for row in custom {
                ui.push_id(row.index, |ui| {
                    if section.editing {
                        Self::edit_custom_row(ui, id, row, actions);
                    } else if let Some(url) = Self::view_custom_row(ui, row) {
                        actions.push(SectionAction::OpenUrl(url));
                    }
                });
            }

            if section.editing && ui.button("+ เพิ่มฟิลด์ใหม่").clicked() {
                actions.push(SectionAction::AddCustomField { id: id.clone() });
            }
        });
    }

    fn view_field_row(ui: &mut Ui, row: &FieldRow) {
        let text = row.display_text();
        match row.field {
            ProfileField::Name => {
                ui.label(RichText::new(text).strong().size(18.0));
            }
            ProfileField::Tagline | ProfileField::About => {
                ui.label(RichText::new(text).weak());
            }
            _ => {
                ui.label(text);
            }
        }
    }

    fn edit_field_row(ui: &mut Ui, id: &str, row: &FieldRow, actions: &mut Vec<SectionAction>) {
        ui.horizontal(|ui| {
            ui.add_sized([72.0, 20.0], egui::Label::new(row.label));

            let mut value = row.value.clone();
            let editor = if row.field == ProfileField::About {
                egui::TextEdit::multiline(&mut value).desired_rows(3)
            } else {
                egui::TextEdit::singleline(&mut value)
            };
            if ui.add(editor.desired_width(320.0)).changed() {
                actions.push(SectionAction::SetField {
                    id: id.to_string(),
                    field: row.field,
                    value,
                });
            }

            if ui.small_button("✕").on_hover_text("ล้างค่า").clicked() {
                actions.push(SectionAction::ClearField {
                    id: id.to_string(),
                    field: FieldRef::Named(row.field.key().to_string()),
                });
            }
        });
    }

    /// Returns the URL when a link was clicked
    fn view_custom_row(ui: &mut Ui, row: &CustomRow) -> Option<String> {
        let mut clicked = None;
        ui.horizontal_wrapped(|ui| {
            ui.label(format!("{}:", row.label));
            match &row.value {
                CustomValue::Link(url) => {
                    if ui.link(url).on_hover_text(url).clicked() {
                        clicked = Some(url.clone());
                    }
                }
                CustomValue::Text(text) => {
                    ui.label(text);
                }
            }
        });
        clicked
    }

    fn edit_custom_row(ui: &mut Ui, id: &str, row: &CustomRow, actions: &mut Vec<SectionAction>) {
        ui.horizontal(|ui| {
            let mut label = row.label.clone();
            if ui
                .add(egui::TextEdit::singleline(&mut label).desired_width(120.0))
                .changed()
            {
                actions.push(SectionAction::UpdateCustomField {
                    id: id.to_string(),
                    index: row.index,
                    attr: CustomAttr::Label,
                    value: label,
                });
            }

            let mut value = row.value.as_str().to_string();
            if ui
                .add(egui::TextEdit::singleline(&mut value).desired_width(240.0))
                .changed()
            {
                actions.push(SectionAction::UpdateCustomField {
                    id: id.to_string(),
                    index: row.index,
                    attr: CustomAttr::Value,
                    value,
                });
            }

            if ui.small_button("✕").on_hover_text("ลบฟิลด์").clicked() {
                actions.push(SectionAction::ClearField {
                    id: id.to_string(),
                    field: FieldRef::Custom(row.index),
                });
            }
        });
    }
}
