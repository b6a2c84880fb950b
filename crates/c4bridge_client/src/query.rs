//! Query-string merging for web driver requests.

use url::Url;

/// Name of the RPC verb parameter (`get` or `set`).
pub const COMMAND: &str = "command";
/// Proxy whose variables are read or written.
pub const PROXY_ID: &str = "proxyID";
/// Comma-joined variable IDs for `get`, a single ID for `set`.
pub const VARIABLE_ID: &str = "variableID";
/// Value written by `set`.
pub const NEW_VALUE: &str = "newValue";

/// Merge `params` into the query string of `base`.
///
/// Pairs already on `base` keep their order. A key repeated on `base`
/// collapses to one pair at its first position holding its last value.
/// Keys in `params` overwrite colliding pairs in place; new keys are appended
/// in the order given. Path, fragment and authority are untouched.
pub fn merge_query<K, V>(base: &Url, params: &[(K, V)]) -> Url
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, value) in base.query_pairs() {
        upsert(&mut pairs, &key, value.into_owned());
    }
    for (key, value) in params {
        upsert(&mut pairs, key.as_ref(), value.as_ref().to_string());
    }

    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut().extend_pairs(pairs.iter());
    url
}

fn upsert(pairs: &mut Vec<(String, String)>, key: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => pairs.push((key.to_string(), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_preserves_existing_parameters() {
        let merged = merge_query(
            &url("http://host/api?token=abc"),
            &[
                (COMMAND, "get"),
                (PROXY_ID, "42"),
                (VARIABLE_ID, "1000,1001"),
            ],
        );
        insta::assert_snapshot!(
            merged.as_str(),
            @"http://host/api?token=abc&command=get&proxyID=42&variableID=1000%2C1001"
        );
    }

    #[test]
    fn test_overwrites_reserved_keys_in_place() {
        let merged = merge_query(
            &url("http://host/api?command=stale&token=abc&proxyID=1"),
            &[(COMMAND, "set"), (PROXY_ID, "7"), (VARIABLE_ID, "1000")],
        );
        insta::assert_snapshot!(
            merged.as_str(),
            @"http://host/api?command=set&token=abc&proxyID=7&variableID=1000"
        );
    }

    #[test]
    fn test_duplicate_base_keys_keep_last_value() {
        let merged = merge_query(&url("http://host/?a=1&b=2&a=3"), &[(COMMAND, "get")]);
        let pairs: Vec<(String, String)> = merged.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string()),
                ("command".to_string(), "get".to_string()),
            ]
        );
    }

    #[test]
    fn test_non_reserved_parameters_pass_through() {
        let base = url("http://host:9000/c4/api?z=last&a=first&space=a%20b#frag");
        let merged = merge_query(
            &base,
            &[(COMMAND, "set"), (NEW_VALUE, "Heat Cool")],
        );

        let pairs: Vec<(String, String)> = merged.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("z".to_string(), "last".to_string()));
        assert_eq!(pairs[1], ("a".to_string(), "first".to_string()));
        assert_eq!(pairs[2], ("space".to_string(), "a b".to_string()));
        assert_eq!(pairs[4], ("newValue".to_string(), "Heat Cool".to_string()));

        assert_eq!(merged.path(), "/c4/api");
        assert_eq!(merged.port(), Some(9000));
        assert_eq!(merged.fragment(), Some("frag"));
    }

    #[test]
    fn test_base_without_query() {
        let merged = merge_query(
            &url("https://controller.local/driver"),
            &[(COMMAND, "get"), (PROXY_ID, "3"), (VARIABLE_ID, "1104")],
        );
        insta::assert_snapshot!(
            merged.as_str(),
            @"https://controller.local/driver?command=get&proxyID=3&variableID=1104"
        );
    }
}
