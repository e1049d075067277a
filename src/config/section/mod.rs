//! Configuration section definitions.
//!
//! Each module corresponds to a key of the JSON config file:
//!
//! | Module     | JSON key       | Purpose                                |
//! |------------|----------------|----------------------------------------|
//! | `settings` | `settings`     | Extension metadata (addon id)          |
//! | `watch`    | `watch`        | Watch root, debounce, ignore patterns  |
//! | `build`    | `build`        | Build command and produced artifact    |
//! | `worker`   | `worker`       | Worker command and termination policy  |
//! | `notify`   | `notify`       | Desktop notification settings          |

mod build;
mod notify;
mod settings;
mod watch;
mod worker;

pub use build::BuildConfig;
pub use notify::NotifyConfig;
pub use settings::SettingsConfig;
pub use watch::WatchConfig;
pub use worker::WorkerConfig;
