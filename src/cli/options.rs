//! Free-form `-key value` options.

use std::collections::BTreeMap;

/// Scans `args` for leading-dash keys. Each key takes the following argument
/// as its value unless that argument is itself a key, in which case the value
/// is absent. Keys keep their dashes; later occurrences overwrite earlier ones.
#[must_use]
pub fn parse_options<S: AsRef<str>>(args: &[S]) -> BTreeMap<String, Option<String>> {
    let mut options = BTreeMap::new();
    for (i, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        if !arg.starts_with('-') {
            continue;
        }
        let value = args.get(i + 1).and_then(|next| {
            let next: &str = next.as_ref();
            (!next.is_empty() && !next.starts_with('-')).then(|| next.to_string())
        });
        options.insert(arg.to_string(), value);
    }
    options
}

/// Looks up `name` regardless of how many dashes preceded it.
#[must_use]
pub fn option<'a>(options: &'a BTreeMap<String, Option<String>>, name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|(key, _)| key.trim_start_matches('-') == name)
        .and_then(|(_, value)| value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_pairs() {
        let opts = parse_options(&["-name", "app", "--project", "starless-app"]);
        assert_eq!(opts.len(), 2);
        assert_eq!(opts["-name"].as_deref(), Some("app"));
        assert_eq!(opts["--project"].as_deref(), Some("starless-app"));
    }

    #[test]
    fn test_flag_followed_by_flag_has_no_value() {
        let opts = parse_options(&["-a", "-b", "x"]);
        assert_eq!(opts["-a"], None);
        assert_eq!(opts["-b"].as_deref(), Some("x"));
    }

    #[test]
    fn test_trailing_flag_and_positionals() {
        let opts = parse_options(&["positional", "-v"]);
        assert_eq!(opts.len(), 1);
        assert_eq!(opts["-v"], None);
        assert!(parse_options::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_option_lookup_ignores_dashes() {
        let opts = parse_options(&["--name", "app", "-project", "command-line-app", "-quiet"]);
        assert_eq!(option(&opts, "name"), Some("app"));
        assert_eq!(option(&opts, "project"), Some("command-line-app"));
        assert_eq!(option(&opts, "quiet"), None);
        assert_eq!(option(&opts, "missing"), None);
    }
}
