//! UI components for the BIO app

pub mod dialogs;
pub mod header;
pub mod images;
pub mod section_card;
pub mod view_model;
