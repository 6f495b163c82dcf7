//! # Events Module
//!
//! Progress reporting for the bulk operations.
//!
//! ## Design
//! Organize, duplicate detection and report generation emit events through a
//! channel, so a CLI spinner (or any other listener) can follow a long scan
//! without the core knowing who is listening.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Duplicate(DuplicateEvent::FileHashed { files_hashed, .. }) = event {
//!             println!("Hashed {} files", files_hashed);
//!         }
//!     }
//! });
//!
//! DuplicateDetector::new(DetectConfig::default()).detect_with_events(&root, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
