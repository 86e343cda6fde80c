//! Search criteria: a conjunction of fixed-prefix clauses.
//!
//! ```text
//! (upnp:class = "object.item.audioItem.musicTrack") and (res@protocolInfo contains "MP3")
//! ```
//!
//! Clauses are recognized by literal prefix only. The bare wildcard `*`
//! selects every resource. Anything else that is not one of the three known
//! forms is compared by exact match against the keyword `object`, which no
//! derived item class equals, so unknown criteria match nothing.

const CLASS_EQUALS: &str = "(upnp:class = \"";
const CLASS_DERIVED: &str = "(upnp:class derivedfrom \"";
const PROTOCOL_CONTAINS: &str = "(res@protocolInfo contains \"";
const AND: &str = ") and (";

/// Fallback keyword for criteria that name no known clause.
pub const OBJECT_KEYWORD: &str = "object";

/// UPnP's "any object" criteria.
pub const WILDCARD: &str = "*";

/// What a clause is tested against.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchTarget<'a> {
    /// Derived UPnP class, `None` for unclassified resources.
    pub class: Option<&'a str>,
    /// Generated `protocolInfo`, `None` when there is no profile.
    pub protocol_info: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause<'a> {
    ClassEquals(&'a str),
    ClassDerivedFrom(&'a str),
    ProtocolContains(&'a str),
    Any,
    Object,
}

impl<'a> Clause<'a> {
    /// Parse the clause at the head of `criteria`.
    pub fn parse(criteria: &'a str) -> Clause<'a> {
        if let Some(rest) = criteria.strip_prefix(CLASS_EQUALS) {
            Clause::ClassEquals(quoted(rest))
        } else if let Some(rest) = criteria.strip_prefix(CLASS_DERIVED) {
            Clause::ClassDerivedFrom(quoted(rest))
        } else if let Some(rest) = criteria.strip_prefix(PROTOCOL_CONTAINS) {
            Clause::ProtocolContains(quoted(rest))
        } else if criteria.trim() == WILDCARD {
            Clause::Any
        } else {
            Clause::Object
        }
    }

    pub fn matches(&self, target: &SearchTarget<'_>) -> bool {
        match *self {
            Clause::ClassEquals(keyword) => target.class == Some(keyword),
            Clause::ClassDerivedFrom(keyword) => {
                target.class.is_some_and(|c| c.starts_with(keyword))
            }
            Clause::ProtocolContains(keyword) => {
                target.protocol_info.is_some_and(|p| p.contains(keyword))
            }
            Clause::Any => true,
            Clause::Object => target.class == Some(OBJECT_KEYWORD),
        }
    }
}

/// Keyword text up to the closing quote, or the whole remainder if unterminated.
fn quoted(rest: &str) -> &str {
    rest.split_once('"').map_or(rest, |(keyword, _)| keyword)
}

/// Evaluate `criteria` against one target, left to right, short-circuiting
/// on the first failing clause.
///
/// `*` matches every target, unclassified ones included. Any other text
/// outside the three clause forms falls back to `object` and matches
/// nothing, including the empty string.
pub fn matches(criteria: &str, target: &SearchTarget<'_>) -> bool {
    let mut remaining = criteria;
    loop {
        if !Clause::parse(remaining).matches(target) {
            return false;
        }
        match remaining.find(AND) {
            // The continuation keeps its opening parenthesis.
            Some(pos) => remaining = &remaining[pos + AND.len() - 1..],
            None => return true,
        }
    }
}
