pub mod router;

pub use router::NotificationRouter;
