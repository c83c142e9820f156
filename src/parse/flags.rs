//! Extraction of the few kubectl flags the relay cares about.
//!
//! The scanner follows GNU-style flag rules loosely enough to find
//! `-n/--namespace` and `-A/--all-namespaces` among arbitrary kubectl flags,
//! and treats every other flag as unknown but legal.

use crate::error::Error;

/// Long name of the all-namespaces flag.
pub const ALL_NAMESPACES_FLAG: &str = "--all-namespaces";
/// Relay-specific flag addressing one cluster among several sharing a channel.
pub const CLUSTER_NAME_FLAG: &str = "--cluster-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagKind {
    /// Takes a value: `--flag=v`, `--flag v`, `-fv`, `-f v`, `-f=v`.
    Value,
    /// Boolean: present means true, `--flag=false` is accepted.
    Bool,
}

#[derive(Debug, Clone, Copy)]
struct Flag {
    long: &'static str,
    short: char,
    kind: FlagKind,
}

const NAMESPACE: Flag = Flag {
    long: "namespace",
    short: 'n',
    kind: FlagKind::Value,
};

const ALL_NAMESPACES: Flag = Flag {
    long: "all-namespaces",
    short: 'A',
    kind: FlagKind::Bool,
};

/// Namespace given with `-n`/`--namespace`, or empty when absent.
///
/// The last occurrence wins.
pub fn extract_namespace(args: &[String]) -> Result<String, Error> {
    Ok(scan(args, &NAMESPACE)?.unwrap_or_default())
}

/// Whether `-A`/`--all-namespaces` is set.
pub fn extract_all_namespaces(args: &[String]) -> Result<bool, Error> {
    match scan(args, &ALL_NAMESPACES)? {
        Some(value) => parse_bool(&value).ok_or_else(|| {
            Error::malformed_flag(
                ALL_NAMESPACES_FLAG,
                format!("invalid boolean value {value:?}"),
            )
        }),
        None => Ok(false),
    }
}

/// Best-effort lookup of `--cluster-name` in a raw chat command.
///
/// Uses POSIX word splitting so quoted values survive, falling back to plain
/// whitespace splitting for unbalanced quotes. Empty values count as absent.
pub fn cluster_name_from_command(command: &str) -> Option<String> {
    let words = shlex::split(command)
        .unwrap_or_else(|| command.split_whitespace().map(String::from).collect());

    let mut iter = words.iter();
    while let Some(word) = iter.next() {
        if word == CLUSTER_NAME_FLAG {
            return iter.next().filter(|v| !v.is_empty()).cloned();
        }
        if let Some(value) = word
            .strip_prefix(CLUSTER_NAME_FLAG)
            .and_then(|r| r.strip_prefix('='))
        {
            return (!value.is_empty()).then(|| value.to_string());
        }
    }
    None
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Walk `args` and return the raw value of the last occurrence of `flag`.
///
/// Unknown long flags written without `=` swallow the next token when it does
/// not look like a flag, so `--cluster-name prod -n foo` still finds `foo`.
fn scan(args: &[String], flag: &Flag) -> Result<Option<String>, Error> {
    let mut found = None;
    let mut next = 0;

    while next < args.len() {
        let arg = args[next].as_str();
        next += 1;

        if arg == "--" {
            break;
        }

        if let Some(long) = arg.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            if name.is_empty() || name.starts_with('-') {
                return Err(Error::malformed_flag(arg, "bad flag syntax"));
            }

            if name != flag.long {
                if inline.is_none() && args.get(next).is_some_and(|a| !a.starts_with('-')) {
                    next += 1;
                }
                continue;
            }

            match (inline, flag.kind) {
                (Some(value), _) => found = Some(value.to_string()),
                (None, FlagKind::Bool) => found = Some("true".to_string()),
                (None, FlagKind::Value) => {
                    let Some(value) = args.get(next) else {
                        return Err(Error::malformed_flag(
                            format!("--{}", flag.long),
                            "flag needs an argument",
                        ));
                    };
                    found = Some(value.clone());
                    next += 1;
                }
            }
            continue;
        }

        if let Some(group) = arg.strip_prefix('-')
            && !group.is_empty()
        {
            next = scan_shorthands(group, args, next, flag, &mut found)?;
        }
    }

    Ok(found)
}

/// Scan one shorthand group such as `-An` or `-nkube-system`.
///
/// Returns the index of the next unconsumed argument.
fn scan_shorthands(
    group: &str,
    args: &[String],
    mut next: usize,
    flag: &Flag,
    found: &mut Option<String>,
) -> Result<usize, Error> {
    let mut rest = group;

    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];

        if c != flag.short {
            if after.starts_with('=') {
                break;
            }
            // Last unknown shorthand in a group may own the following value.
            if after.is_empty() && args.get(next).is_some_and(|a| !a.starts_with('-')) {
                next += 1;
            }
            rest = after;
            continue;
        }

        if let Some(value) = after.strip_prefix('=') {
            *found = Some(value.to_string());
            break;
        }

        match flag.kind {
            FlagKind::Bool => {
                *found = Some("true".to_string());
                rest = after;
            }
            FlagKind::Value if !after.is_empty() => {
                *found = Some(after.to_string());
                break;
            }
            FlagKind::Value => {
                let Some(value) = args.get(next) else {
                    return Err(Error::malformed_flag(
                        format!("-{c}"),
                        "flag needs an argument",
                    ));
                };
                *found = Some(value.clone());
                next += 1;
                break;
            }
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn ns(line: &str) -> String {
        extract_namespace(&args(line)).unwrap()
    }

    fn all_ns(line: &str) -> bool {
        extract_all_namespaces(&args(line)).unwrap()
    }

    #[test]
    fn namespace_absent() {
        assert_eq!(ns("get pods"), "");
    }

    #[test]
    fn namespace_forms() {
        assert_eq!(ns("get pods -n foo"), "foo");
        assert_eq!(ns("get pods -nfoo"), "foo");
        assert_eq!(ns("get pods -n=foo"), "foo");
        assert_eq!(ns("get pods --namespace foo"), "foo");
        assert_eq!(ns("get pods --namespace=foo"), "foo");
    }

    #[test]
    fn namespace_before_verb() {
        assert_eq!(ns("-n foo get pods"), "foo");
    }

    #[test]
    fn namespace_last_wins() {
        assert_eq!(ns("get pods -n foo --namespace bar"), "bar");
    }

    #[test]
    fn namespace_in_shorthand_group() {
        assert_eq!(ns("get pods -An foo"), "foo");
    }

    #[test]
    fn namespace_tolerates_unknown_flags() {
        assert_eq!(ns("get pods --cluster-name prod -n foo"), "foo");
        assert_eq!(ns("get pods --cluster-name=prod -n foo"), "foo");
        assert_eq!(ns("get pods -o wide -n foo"), "foo");
        assert_eq!(ns("logs mypod --follow -n foo"), "foo");
    }

    #[test]
    fn namespace_after_terminator_ignored() {
        assert_eq!(ns("exec mypod -- ls -n foo"), "");
    }

    #[test]
    fn namespace_missing_value() {
        let err = extract_namespace(&args("get pods -n")).unwrap_err();
        assert!(matches!(err, Error::MalformedFlag { ref flag, .. } if flag == "-n"));

        let err = extract_namespace(&args("get pods --namespace")).unwrap_err();
        assert!(matches!(err, Error::MalformedFlag { ref flag, .. } if flag == "--namespace"));
    }

    #[test]
    fn bad_long_flag_syntax() {
        let err = extract_namespace(&args("get pods ---n foo")).unwrap_err();
        assert!(matches!(err, Error::MalformedFlag { .. }));
    }

    #[test]
    fn all_namespaces_forms() {
        assert!(!all_ns("get pods"));
        assert!(all_ns("get pods -A"));
        assert!(all_ns("get pods --all-namespaces"));
        assert!(all_ns("get pods --all-namespaces=true"));
        assert!(!all_ns("get pods --all-namespaces=false"));
        assert!(all_ns("get pods -oA -A"));
        assert!(all_ns("get pods -An foo"));
        assert!(!all_ns("get pods -A=false"));
    }

    #[test]
    fn all_namespaces_invalid_value() {
        let err = extract_all_namespaces(&args("get pods --all-namespaces=maybe")).unwrap_err();
        assert!(matches!(err, Error::MalformedFlag { ref flag, .. } if flag == "--all-namespaces"));
        assert_eq!(
            err.to_string(),
            "malformed flag '--all-namespaces': invalid boolean value \"maybe\""
        );
    }

    #[test]
    fn namespace_missing_value_message() {
        let err = extract_namespace(&args("get pods -n")).unwrap_err();
        assert_eq!(err.to_string(), "malformed flag '-n': flag needs an argument");
    }

    #[test]
    fn all_namespaces_ignores_value_flags() {
        // `-n A` is a namespace named "A", not the all-namespaces shorthand.
        assert!(!all_ns("get pods -n A"));
    }

    #[test]
    fn both_flags_present() {
        let a = args("get pods -A -n foo");
        assert!(extract_all_namespaces(&a).unwrap());
        assert_eq!(extract_namespace(&a).unwrap(), "foo");
    }

    #[test]
    fn cluster_name_separate_value() {
        assert_eq!(
            cluster_name_from_command("get pods --cluster-name prod"),
            Some("prod".to_string())
        );
    }

    #[test]
    fn cluster_name_inline_value() {
        assert_eq!(
            cluster_name_from_command("get pods --cluster-name=prod -n foo"),
            Some("prod".to_string())
        );
    }

    #[test]
    fn cluster_name_quoted() {
        assert_eq!(
            cluster_name_from_command("get pods --cluster-name 'prod eu'"),
            Some("prod eu".to_string())
        );
    }

    #[test]
    fn cluster_name_unbalanced_quote_falls_back() {
        assert_eq!(
            cluster_name_from_command("get pods 'oops --cluster-name prod"),
            Some("prod".to_string())
        );
    }

    #[test]
    fn cluster_name_absent_or_empty() {
        assert_eq!(cluster_name_from_command("get pods"), None);
        assert_eq!(cluster_name_from_command("get pods --cluster-name"), None);
        assert_eq!(cluster_name_from_command("get pods --cluster-name="), None);
    }
}
