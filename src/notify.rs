use notify_rust::Notification;

/// Fire-and-forget desktop notifications. A failed notification must never
/// affect the outcome of the action that sent it.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, summary: &str, body: &str);
}

pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) {
        if let Err(e) = Notification::new()
            .appname("hushkey")
            .summary(summary)
            .body(body)
            .show()
        {
            log::debug!("notification failed: {}", e);
        }
    }
}
