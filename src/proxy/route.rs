//! Classification of incoming GOPROXY request paths
//!
//! ```text
//! /[<cooldown>/]<module>/@v/list
//! /[<cooldown>/]<module>/@v/<version>.info
//! /[<cooldown>/]<module>/@v/<version>.mod
//! /[<cooldown>/]<module>/@v/<version>.zip
//! /[<cooldown>/]<module>/@latest
//! ```
//!
//! Paths are matched as received, without percent-decoding.

use chrono::TimeDelta;

use crate::cooldown::duration::parse_duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `<module>/@v/list`
    List { module: String },
    /// `<module>/@v/<version>.info`
    Info { module: String, version: String },
    /// `<module>/@latest`
    Latest { module: String },
    /// `<module>/@v/<version>.mod` and `.zip`, redirected upstream
    Download { path: String },
    /// Anything else, forwarded upstream unchanged
    PassThrough { path: String },
}

/// A classified request: the cooldown to apply and what is being asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub cooldown: TimeDelta,
    pub operation: Operation,
}

/// Classifies `path`, honouring a leading duration segment as a per-request cooldown.
///
/// A first segment that does not parse as a duration is part of the module path,
/// in which case `default_cooldown` applies.
pub fn classify(path: &str, default_cooldown: TimeDelta) -> ProxyRequest {
    match strip_cooldown(path) {
        Some((cooldown, rest)) => ProxyRequest {
            cooldown,
            operation: classify_path(&rest),
        },
        None => ProxyRequest {
            cooldown: default_cooldown,
            operation: classify_path(path),
        },
    }
}

/// Splits `/<duration>/<rest>` into the duration and `/<rest>`
fn strip_cooldown(path: &str) -> Option<(TimeDelta, String)> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (segment, rest) = trimmed.split_once('/')?;
    let cooldown = parse_duration(segment).ok()?;
    Some((cooldown, format!("/{rest}")))
}

fn classify_path(path: &str) -> Operation {
    let pass_through = || Operation::PassThrough {
        path: path.to_string(),
    };
    let trimmed = path.strip_prefix('/').unwrap_or(path);

    if let Some(module) = trimmed.strip_suffix("/@latest") {
        if module.is_empty() {
            return pass_through();
        }
        return Operation::Latest {
            module: module.to_string(),
        };
    }

    let mut parts = trimmed.split("/@v/");
    let (Some(module), Some(file), None) = (parts.next(), parts.next(), parts.next()) else {
        return pass_through();
    };
    if module.is_empty() {
        return pass_through();
    }

    if file == "list" {
        return Operation::List {
            module: module.to_string(),
        };
    }

    if let Some(version) = file.strip_suffix(".info") {
        if version.is_empty() {
            return pass_through();
        }
        return Operation::Info {
            module: module.to_string(),
            version: version.to_string(),
        };
    }

    if file.ends_with(".mod") || file.ends_with(".zip") {
        return Operation::Download {
            path: path.to_string(),
        };
    }

    pass_through()
}
