//! Lead capture from the landing page form.

pub mod model;
pub mod notifier;

pub use model::{LANDING_ORIGIN, Lead};
pub use notifier::{DisabledNotifier, EmailWebhookNotifier, LeadNotifier, notifier_from_config};
