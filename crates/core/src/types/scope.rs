use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::fmt;

/// A named variable namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Application,
    Arguments,
    Attributes,
    Caller,
    Cffile,
    Cgi,
    Client,
    Cookie,
    Flash,
    Form,
    Local,
    Request,
    Server,
    Session,
    Static,
    Super,
    This,
    ThisTag,
    Thread,
    ThreadLocal,
    Url,
    Variables,
    #[default]
    Unknown,
}

impl_case_insensitive_deserialize!(
    Scope,
    Application => "application",
    Arguments => "arguments",
    Attributes => "attributes",
    Caller => "caller",
    Cffile => "cffile",
    Cgi => "cgi",
    Client => "client",
    Cookie => "cookie",
    Flash => "flash",
    Form => "form",
    Local => "local",
    Request => "request",
    Server => "server",
    Session => "session",
    Static => "static",
    Super => "super",
    This => "this",
    ThisTag => "thistag",
    Thread => "thread",
    ThreadLocal => "threadlocal",
    Url => "url",
    Variables => "variables",
    Unknown => "unknown"
);

/// Scopes searched, in order, when resolving an unscoped reference
pub const SCOPE_RESOLUTION_PRECEDENCE: [Scope; 11] = [
    Scope::Local,
    Scope::Arguments,
    Scope::ThreadLocal,
    Scope::Thread,
    Scope::Variables,
    Scope::Cgi,
    Scope::Cffile,
    Scope::Url,
    Scope::Form,
    Scope::Cookie,
    Scope::Client,
];

/// Scope names that may prefix an identifier in source (`local.x`, `url["x"]`).
///
/// Kept in sync with [`Scope::from_prefix`]; used to build assignment patterns.
pub const SCOPE_PREFIXES: [&str; 21] = [
    "application",
    "arguments",
    "attributes",
    "caller",
    "cffile",
    "cgi",
    "client",
    "cookie",
    "flash",
    "form",
    "local",
    "request",
    "server",
    "session",
    "static",
    "super",
    "this",
    "thistag",
    "thread",
    "url",
    "variables",
];

impl Scope {
    /// Recognise an explicit scope prefix as written in source
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let scope = match prefix.trim().to_ascii_lowercase().as_str() {
            "application" => Scope::Application,
            "arguments" => Scope::Arguments,
            "attributes" => Scope::Attributes,
            "caller" => Scope::Caller,
            "cffile" => Scope::Cffile,
            "cgi" => Scope::Cgi,
            "client" => Scope::Client,
            "cookie" => Scope::Cookie,
            "flash" => Scope::Flash,
            "form" => Scope::Form,
            "local" => Scope::Local,
            "request" => Scope::Request,
            "server" => Scope::Server,
            "session" => Scope::Session,
            "static" => Scope::Static,
            "super" => Scope::Super,
            "this" => Scope::This,
            "thistag" => Scope::ThisTag,
            "thread" => Scope::Thread,
            "url" => Scope::Url,
            "variables" => Scope::Variables,
            _ => return None,
        };
        Some(scope)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Application => "application",
            Scope::Arguments => "arguments",
            Scope::Attributes => "attributes",
            Scope::Caller => "caller",
            Scope::Cffile => "cffile",
            Scope::Cgi => "cgi",
            Scope::Client => "client",
            Scope::Cookie => "cookie",
            Scope::Flash => "flash",
            Scope::Form => "form",
            Scope::Local => "local",
            Scope::Request => "request",
            Scope::Server => "server",
            Scope::Session => "session",
            Scope::Static => "static",
            Scope::Super => "super",
            Scope::This => "this",
            Scope::ThisTag => "thisTag",
            Scope::Thread => "thread",
            Scope::ThreadLocal => "threadLocal",
            Scope::Url => "url",
            Scope::Variables => "variables",
            Scope::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_prefix() {
        assert_eq!(Scope::from_prefix("VARIABLES"), Some(Scope::Variables));
        assert_eq!(Scope::from_prefix("local"), Some(Scope::Local));
        assert_eq!(Scope::from_prefix("thisTag"), Some(Scope::ThisTag));
        assert_eq!(Scope::from_prefix("foo"), None);
    }

    #[test]
    fn test_every_prefix_is_recognised() {
        for prefix in SCOPE_PREFIXES {
            assert!(Scope::from_prefix(prefix).is_some(), "{prefix} not recognised");
        }
    }

    #[test]
    fn test_precedence_starts_with_local() {
        assert_eq!(SCOPE_RESOLUTION_PRECEDENCE[0], Scope::Local);
        assert_eq!(SCOPE_RESOLUTION_PRECEDENCE[1], Scope::Arguments);
        assert!(!SCOPE_RESOLUTION_PRECEDENCE.contains(&Scope::Unknown));
    }
}
