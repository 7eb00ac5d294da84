// src/constants.rs
//
// Application-wide constants shared by the HTTP client, configuration and presenter.

/// Host used when neither the config file nor `--host` provides one.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_HOST: &str = "localhost:8080";

/// Fixed path prefix of every backend route.
///
/// Used in: `infrastructure/config.rs`
pub const API_BASE_PATH: &str = "/api/v1";

/// Wire format of `created_at` / `updated_at`.
///
/// Six fractional digits and a numeric offset (`+0000`), the equivalent of
/// `yyyy-MM-dd'T'HH:mm:ss.SSSSSSZ`. Chrono formats and parses this without
/// consulting the host locale or timezone.
///
/// Used in: `domain/timestamp.rs`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%z";

/// Number of content lines shown under a title in the list view.
///
/// Used in: `ports/terminal.rs`
pub const PREVIEW_LINES: usize = 3;

/// Directory name below the platform config dir holding `config.toml`.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_DIR_NAME: &str = "notedesk";
