pub mod credentials;
pub mod form;
