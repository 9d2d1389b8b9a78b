pub mod calls;
pub mod voicemail;
pub mod webhooks;
