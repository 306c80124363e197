pub mod scam_phishing_alert;
pub mod sign_modals;
pub mod sign_step_body;
