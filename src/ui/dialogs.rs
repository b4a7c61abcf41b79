//! Login and change-password dialogs

use eframe::egui;

/// Admin login dialog
#[derive(Default)]
pub struct LoginDialog {
    pub visible: bool,
    pub password: String,
    /// Rejection notice from the last attempt
    pub error: Option<String>,
}

impl LoginDialog {
    pub fn open(&mut self) {
        self.visible = true;
        self.password.clear();
        self.error = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.password.clear();
        self.error = None;
    }

    /// Show the dialog. Returns the password when the user submits.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<String> {
        let mut submitted = None;
        let mut open = self.visible;

        if self.visible {
            egui::Window::new("เข้าสู่ระบบ Admin")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.password)
                            .password(true)
                            .hint_text("รหัสผ่าน Admin"),
                    );
                    let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    if let Some(error) = &self.error {
                        ui.colored_label(ui.visuals().error_fg_color, error);
                    }

                    ui.add_space(8.0);
                    if ui.button("เข้าสู่ระบบ").clicked() || enter {
                        submitted = Some(self.password.clone());
                    }
                });
        }

        if !open {
            self.close();
        }
        submitted
    }
}

/// Dialog for replacing the admin secret
#[derive(Default)]
pub struct SecretDialog {
    pub visible: bool,
    pub current: String,
    pub new: String,
    pub error: Option<String>,
}

impl SecretDialog {
    pub fn open(&mut self) {
        self.visible = true;
        self.current.clear();
        self.new.clear();
        self.error = None;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.current.clear();
        self.new.clear();
        self.error = None;
    }

    /// Show the dialog. Returns `(current, new)` when the user submits.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<(String, String)> {
        let mut submitted = None;
        let mut open = self.visible;

        if self.visible {
            egui::Window::new("เปลี่ยนรหัสผ่าน")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    egui::Grid::new("secret_grid").num_columns(2).show(ui, |ui| {
                        ui.label("รหัสผ่านเดิม");
                        ui.add(egui::TextEdit::singleline(&mut self.current).password(true));
                        ui.end_row();

                        ui.label("รหัสผ่านใหม่");
                        ui.add(egui::TextEdit::singleline(&mut self.new).password(true));
                        ui.end_row();
                    });

                    if let Some(error) = &self.error {
                        ui.colored_label(ui.visuals().error_fg_color, error);
                    }

                    ui.add_space(8.0);
                    if ui.button("บันทึก").clicked() {
                        submitted = Some((self.current.clone(), self.new.clone()));
                    }
                });
        }

        if !open {
            self.close();
        }
        submitted
    }
}
