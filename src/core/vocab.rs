//! Fixed vocabulary of the note corpus
//!
//! The repair engine works against a closed set of field keys and a fixed
//! acronym table. Both are compile-time data: the splitter and the rebuilder
//! only ever break a line in front of one of [`KNOWN_KEYS`].

/// Marker line that opens and closes a front matter block
pub const DELIMITER: &str = "---";

/// Every field key the corpus templates use
pub const KNOWN_KEYS: &[&str] = &[
    "type",
    "topics",
    "status",
    "level",
    "title",
    "summary",
    "platforms",
    "ios_min",
    "tags",
    "severity",
    "duration",
];

/// Keys whose value is a list of strings
pub const SEQUENCE_KEYS: &[&str] = &["topics", "tags", "platforms"];

/// Key of the human-readable title scalar
pub const TITLE_KEY: &str = "title";

const ACRONYMS: &[(&str, &str)] = &[
    ("ios", "iOS"),
    ("api", "API"),
    ("grpc", "gRPC"),
    ("sse", "SSE"),
    ("mqtt", "MQTT"),
    ("apns", "APNs"),
    ("webrtc", "WebRTC"),
    ("url", "URL"),
    ("ws", "WS"),
    ("http", "HTTP"),
    ("https", "HTTPS"),
    ("rpc", "RPC"),
    ("json", "JSON"),
    ("xml", "XML"),
];

/// Canonical casing for a domain acronym, matched case-insensitively
pub fn acronym(token: &str) -> Option<&'static str> {
    let lower = token.to_lowercase();
    ACRONYMS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, canonical)| *canonical)
}

pub fn is_sequence_key(key: &str) -> bool {
    SEQUENCE_KEYS.contains(&key)
}

/// Returns the known key that `text` starts with, provided it is followed by
/// optional blanks, a colon and at least one whitespace character.
pub fn known_key_at(text: &str) -> Option<&'static str> {
    KNOWN_KEYS.iter().copied().find(|key| {
        text.strip_prefix(key)
            .map(|rest| rest.trim_start_matches([' ', '\t']))
            .and_then(|rest| rest.strip_prefix(':'))
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace)
    })
}
