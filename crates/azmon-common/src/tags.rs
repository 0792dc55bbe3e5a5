//! Resource tag lookup
//!
//! Monitored resources carry a tag (by default `sys_id`) whose value is the
//! monitoring host's stable identifier. Tag keys are matched
//! case-insensitively because portal users spell them freely; values are
//! matched exactly.

use std::collections::HashMap;

/// Value of `key` in `tags`, ignoring the key's case
pub fn tag_value<'a>(tags: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

/// Whether `tags` carries `key` with exactly `value`
pub fn has_tag(tags: &HashMap<String, String>, key: &str, value: &str) -> bool {
    tag_value(tags, key) == Some(value)
}
