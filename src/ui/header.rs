//! Top bar with the admin controls

use eframe::egui::{self, RichText};

use crate::core::admin::AdminState;

/// Something the user asked for in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    ShowLogin,
    ToggleEditing,
    Logout,
    AddSection,
    ShowChangeSecret,
    DismissNotice,
}

/// Header bar
pub struct HeaderBar;

impl HeaderBar {
    /// Show the header bar
    pub fn show(ui: &mut egui::Ui, admin: AdminState, notice: Option<&str>) -> Option<HeaderAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(RichText::new("BIO App").strong());

            if let Some(notice) = notice {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, notice);
                if ui.small_button("✕").clicked() {
                    action = Some(HeaderAction::DismissNotice);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                match admin {
                    AdminState::LoggedOut => {
                        if ui.button("กดแก้ไขได้ เฉพาะ Admin").clicked() {
                            action = Some(HeaderAction::ShowLogin);
                        }
                    }
                    AdminState::Viewing | AdminState::Editing => {
                        // Right-to-left: last added is leftmost
                        if admin == AdminState::Editing {
                            if ui.button("เปลี่ยนรหัสผ่าน").clicked() {
                                action = Some(HeaderAction::ShowChangeSecret);
                            }
                            if ui.button("+ เพิ่มหัวข้อ").clicked() {
                                action = Some(HeaderAction::AddSection);
                            }
                        }
                        if ui.button("ออกจากระบบ").clicked() {
                            action = Some(HeaderAction::Logout);
                        }
                        let toggle = if admin == AdminState::Editing {
                            "🔓 Editing"
                        } else {
                            "🔒 View"
                        };
                        if ui
                            .selectable_label(admin == AdminState::Editing, toggle)
                            .clicked()
                        {
                            action = Some(HeaderAction::ToggleEditing);
                        }
                    }
                }
            });
        });

        action
    }
}
