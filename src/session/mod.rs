pub mod history;
pub mod quiz;
pub mod record;
pub mod study;
pub mod timer;
