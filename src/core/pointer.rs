//! Document-pointer escaping.
//!
//! Document paths are built as `#/seg/seg/...`, where every segment is an
//! escaped object member name or an array index. Resource keys are the
//! unescaped path with the `#/` root marker removed.

/// Root marker of every document pointer.
pub const ROOT_REF: &str = "#";

/// JSON-Pointer escape: `~` becomes `~0`, `/` becomes `~1`.
pub fn escape_prop(prop: &str) -> String {
    prop.replace('~', "~0").replace('/', "~1")
}

/// Inverse of [`escape_prop`]. Unknown `~` sequences are left untouched.
pub fn unescape_prop(prop: &str) -> String {
    prop.replace("~1", "/").replace("~0", "~")
}

/// Escape a member name for use as a reference segment.
///
/// On top of [`escape_prop`], the characters `% ^ | \ " space` are
/// percent-encoded.
pub fn escape_ref(prop: &str) -> String {
    escape_prop(prop)
        .replace('%', "%25")
        .replace('^', "%5E")
        .replace('|', "%7C")
        .replace('\\', "%5C")
        .replace('"', "%22")
        .replace(' ', "%20")
}

/// Inverse of [`escape_ref`].
pub fn unescape_ref(reference: &str) -> String {
    // %25 last so that an escaped "%5E" literal survives the round trip
    unescape_prop(
        &reference
            .replace("%5E", "^")
            .replace("%7C", "|")
            .replace("%5C", "\\")
            .replace("%22", "\"")
            .replace("%20", " ")
            .replace("%25", "%"),
    )
}

/// Append one member segment to a document pointer.
pub fn child_ref(parent: &str, prop: &str) -> String {
    format!("{}/{}", parent, escape_ref(prop))
}

/// Append one array index segment to a document pointer.
pub fn index_ref(parent: &str, index: usize) -> String {
    format!("{}/{}", parent, index)
}

/// Derive a resource key from a document pointer.
///
/// `#/strings/a` yields `strings/a`; the bare root yields an empty key.
pub fn key_from_ref(reference: &str) -> String {
    let unescaped = unescape_ref(reference);
    unescaped
        .strip_prefix("#/")
        .or_else(|| unescaped.strip_prefix(ROOT_REF))
        .unwrap_or(&unescaped)
        .to_string()
}

#[cfg(test)]
mod tests {
    use crate::core::pointer::*;

    #[test]
    fn test_escape_prop() {
        assert_eq!(escape_prop("escape/tilde~tilde"), "escape~1tilde~0tilde");
        assert_eq!(escape_prop("permissions"), "permissions");
        assert_eq!(
            escape_prop("permissions% \" ^ | \\"),
            "permissions% \" ^ | \\"
        );
    }

    #[test]
    fn test_unescape_prop() {
        assert_eq!(unescape_prop("escape~1tilde~0tilde"), "escape/tilde~tilde");
        // unknown escapes stay as they are
        assert_eq!(unescape_prop("escape~3tilde~4tilde"), "escape~3tilde~4tilde");
    }

    #[test]
    fn test_escape_prop_round_trip() {
        for s in ["", "~", "/", "~1", "~0", "a/~b~/c", "~~//", "/~1~0/"] {
            assert_eq!(unescape_prop(&escape_prop(s)), s, "round trip of {:?}", s);
        }
    }

    #[test]
    fn test_escape_ref() {
        assert_eq!(escape_ref("escape/tilde~tilde"), "escape~1tilde~0tilde");
        assert_eq!(
            escape_ref("permissions% \" ^ | \\"),
            "permissions%25%20%22%20%5E%20%7C%20%5C"
        );
    }

    #[test]
    fn test_unescape_ref() {
        assert_eq!(
            unescape_ref("permissions%25%20%22%20%5E%20%7C%20%5C"),
            "permissions% \" ^ | \\"
        );
        assert_eq!(unescape_ref("escape~1tilde~0tilde"), "escape/tilde~tilde");
    }

    #[test]
    fn test_key_from_ref() {
        let reference = child_ref(&child_ref(ROOT_REF, "strings"), "string 1");
        assert_eq!(reference, "#/strings/string%201");
        assert_eq!(key_from_ref(&reference), "strings/string 1");
        assert_eq!(key_from_ref(&child_ref(ROOT_REF, "/user")), "/user");
        assert_eq!(key_from_ref(&index_ref("#/list", 2)), "list/2");
        assert_eq!(key_from_ref(ROOT_REF), "");
    }
}
