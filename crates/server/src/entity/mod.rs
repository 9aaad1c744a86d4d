pub mod audit_event;
pub mod settings_option;
pub mod trusted_ip;
