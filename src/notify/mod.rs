// Outbound notifications
pub mod telegram;

pub use telegram::{format_signal_message, Notifier, TelegramNotifier};
