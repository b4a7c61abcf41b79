//! Main application state and UI coordination

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use eframe::egui;

use crate::core::admin::{AdminError, AdminGate, INCORRECT_PASSWORD_NOTICE};
use crate::core::config::AppConfig;
use crate::core::image::{ImageLoader, ImageReadOutcome, IMAGE_EXTENSIONS};
use crate::core::model::Document;
use crate::core::mutate;
use crate::core::state::{DocumentState, DOCUMENT_KEY};
use crate::core::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::ui::dialogs::{LoginDialog, SecretDialog};
use crate::ui::header::{HeaderAction, HeaderBar};
use crate::ui::images::ImageCache;
use crate::ui::section_card::{SectionAction, SectionCard};
use crate::ui::view_model::project;

/// Main application state
pub struct BioApp {
    /// Persistence for the document and the admin flags
    store: Box<dyn KeyValueStore>,
    /// The live document
    state: DocumentState,
    /// Editing gate
    gate: AdminGate,
    /// Background reader for picked image files
    image_loader: Option<ImageLoader>,
    /// Decoded embedded images
    image_cache: ImageCache,
    /// Image URL inputs per section
    url_drafts: HashMap<String, String>,
    login_dialog: LoginDialog,
    secret_dialog: SecretDialog,
    /// Transient message in the header bar
    notice: Option<String>,
}

impl BioApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        Self::configure_fonts(&cc.egui_ctx, config);
        cc.egui_ctx.set_visuals(if config.dark_theme() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let store: Box<dyn KeyValueStore> = match config.storage_path() {
            Some(path) => Box::new(FileStore::open(path)),
            None => {
                tracing::warn!("No data directory available, changes will not be kept");
                Box::new(MemoryStore::new())
            }
        };

        let ctx = cc.egui_ctx.clone();
        let image_loader = match ImageLoader::new(move || ctx.request_repaint()) {
            Ok(loader) => Some(loader),
            Err(e) => {
                tracing::error!("Image reader unavailable: {}", e);
                None
            }
        };

        Self::with_store(store, image_loader)
    }

    /// Create an application over an existing store
    pub fn with_store(store: Box<dyn KeyValueStore>, image_loader: Option<ImageLoader>) -> Self {
        let state = DocumentState::load(store.as_ref(), DOCUMENT_KEY);
        let gate = AdminGate::restore(store.as_ref());
        tracing::info!("Loaded {} section(s)", state.document().sections.len());

        Self {
            store,
            state,
            gate,
            image_loader,
            image_cache: ImageCache::default(),
            url_drafts: HashMap::new(),
            login_dialog: LoginDialog::default(),
            secret_dialog: SecretDialog::default(),
            notice: None,
        }
    }

    /// Add a font with Thai glyphs as a fallback for the bundled fonts
    fn configure_fonts(ctx: &egui::Context, config: &AppConfig) {
        let Some(path) = &config.ui.font_path else {
            return;
        };

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not load font {}: {}", path.display(), e);
                return;
            }
        };

        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("thai".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push("thai".to_owned());
        }
        ctx.set_fonts(fonts);
        tracing::info!("Loaded font: {}", path.display());
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        self.state.document()
    }

    /// Apply a document edit while editing is allowed, then persist
    fn edit(&mut self, change: impl FnOnce(&Document) -> Document) {
        if !self.gate.can_edit() {
            tracing::debug!("Ignoring edit outside editing mode");
            return;
        }
        let next = change(self.state.document());
        self.state.commit(self.store.as_mut(), next);
    }

    /// Try the password from the login dialog
    pub fn submit_login(&mut self, password: &str) {
        match self.gate.login(self.store.as_mut(), password) {
            Ok(()) => self.login_dialog.close(),
            Err(_) => self.login_dialog.error = Some(INCORRECT_PASSWORD_NOTICE.to_string()),
        }
    }

    fn submit_secret_change(&mut self, current: &str, new: &str) {
        match self.gate.change_secret(self.store.as_mut(), current, new) {
            Ok(()) => {
                self.secret_dialog.close();
                self.notice = Some("เปลี่ยนรหัสผ่านแล้ว".to_string());
            }
            Err(e @ AdminError::Storage(_)) => {
                tracing::error!("Could not store new secret: {}", e);
                self.secret_dialog.error = Some(e.to_string());
            }
            Err(e) => self.secret_dialog.error = Some(e.to_string()),
        }
    }

    pub fn apply_header_action(&mut self, action: HeaderAction) {
        match action {
            HeaderAction::ShowLogin => self.login_dialog.open(),
            HeaderAction::ToggleEditing => self.gate.toggle_editing(),
            HeaderAction::Logout => {
                self.gate.logout(self.store.as_mut());
                self.secret_dialog.close();
            }
            HeaderAction::AddSection => {
                let mut added = None;
                self.edit(|doc| {
                    let (next, id) = mutate::add_section(doc, SystemTime::now());
                    added = Some(id);
                    next
                });
                if let Some(id) = added {
                    tracing::info!("Added section {}", id);
                }
            }
            HeaderAction::ShowChangeSecret => self.secret_dialog.open(),
            HeaderAction::DismissNotice => self.notice = None,
        }
    }

    pub fn apply_section_action(&mut self, action: SectionAction) {
        match action {
            SectionAction::SetTitle { id, title } => {
                self.edit(|doc| mutate::set_section_title(doc, &id, &title));
            }
            SectionAction::SetImageUrl { id, url } => {
                self.edit(|doc| mutate::set_section_image(doc, &id, &url));
            }
            SectionAction::ClearImage { id } => {
                self.edit(|doc| mutate::set_section_image(doc, &id, ""));
            }
            SectionAction::PickImage { id } => self.pick_image(id),
            SectionAction::Remove { id } => {
                self.edit(|doc| mutate::remove_section(doc, &id));
                self.url_drafts.remove(&id);
                tracing::info!("Removed section {}", id);
            }
            SectionAction::SetField { id, field, value } => {
                self.edit(|doc| mutate::set_field(doc, &id, field.key(), &value));
            }
            SectionAction::ClearField { id, field } => {
                self.edit(|doc| mutate::remove_field(doc, &id, &field));
            }
            SectionAction::AddCustomField { id } => {
                self.edit(|doc| mutate::add_custom_field(doc, &id));
            }
            SectionAction::UpdateCustomField {
                id,
                index,
                attr,
                value,
            } => {
                self.edit(|doc| mutate::update_custom_field(doc, &id, index, attr, &value));
            }
            SectionAction::OpenUrl(url) => {
                if let Err(e) = open::that(&url) {
                    tracing::error!("Failed to open {}: {}", url, e);
                }
            }
        }
    }

    /// Ask for an image file and start reading it
    fn pick_image(&mut self, section_id: String) {
        if !self.gate.can_edit() {
            return;
        }
        let Some(loader) = &self.image_loader else {
            self.notice = Some("ไม่สามารถอ่านไฟล์รูปภาพได้".to_string());
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("image", IMAGE_EXTENSIONS)
            .pick_file()
        {
            loader.request(section_id, path);
        }
    }

    /// Resolve a finished image read against the current document
    pub fn apply_image_outcome(&mut self, outcome: ImageReadOutcome) {
        let ImageReadOutcome { section_id, result } = outcome;
        let data_url = match result {
            Ok(data_url) => data_url,
            Err(e) => {
                tracing::warn!("Image read for {} failed: {}", section_id, e);
                self.notice = Some(format!("อ่านรูปภาพไม่สำเร็จ: {}", e));
                return;
            }
        };

        if !self.state.document().contains(&section_id) {
            tracing::debug!("Dropping image for removed section {}", section_id);
            return;
        }

        let next = mutate::set_section_image(self.state.document(), &section_id, &data_url);
        self.state.commit(self.store.as_mut(), next);
        tracing::info!("Set embedded image on {}", section_id);
    }

    fn receive_images(&mut self) {
        let outcomes = match &mut self.image_loader {
            Some(loader) => loader.poll(),
            None => return,
        };
        for outcome in outcomes {
            self.apply_image_outcome(outcome);
        }
    }
}

impl eframe::App for BioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_images();

        let page = project(self.state.document(), &self.gate);
        let mut header_action = None;
        let mut section_actions = Vec::new();

        // Render header bar
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            header_action = HeaderBar::show(ui, page.admin, self.notice.as_deref());
            ui.add_space(4.0);
        });

        if let Some(password) = self.login_dialog.show(ctx) {
            self.submit_login(&password);
        }
        if let Some((current, new)) = self.secret_dialog.show(ctx) {
            self.submit_secret_change(&current, &new);
        }

        // Render section cards
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("sections_scroll")
                .show(ui, |ui| {
                    ui.set_max_width(720.0);
                    for section in &page.sections {
                        section_actions.extend(SectionCard::show(
                            ui,
                            section,
                            &mut self.url_drafts,
                            &mut self.image_cache,
                        ));
                        ui.add_space(12.0);
                    }
                });
        });

        if let Some(action) = header_action {
            self.apply_header_action(action);
        }
        for action in section_actions {
            self.apply_section_action(action);
        }

        let document = self.state.document();
        self.image_cache.retain(|id| document.contains(id));
        self.image_cache.forget_stale(ctx);
    }
}
