pub mod handle_notification;
