pub mod auth_form;
pub mod dashboard;
pub mod header;
pub mod history;
pub mod hub;
pub mod quiz;
