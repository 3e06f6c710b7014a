//! Key/value decoding for `&`/`=` delimited bodies.

use std::collections::HashMap;

use url::form_urlencoded;

/// Decode `a=1&b=2` into a map, percent-decoding names and values.
///
/// A literal `+` stays a `+` (host bodies carry raw JSON, not form
/// encoding). Pairs without `=` map to an empty value; later keys win.
pub fn decode(input: &str) -> HashMap<String, String> {
    let escaped = input.replace('+', "%2B");
    form_urlencoded::parse(escaped.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_equals_only() {
        let map = decode(r#"_error_={"a":"b=c"}"#);
        assert_eq!(map["_error_"], r#"{"a":"b=c"}"#);
    }

    #[test]
    fn percent_decodes_values() {
        let map = decode("msg=hello%20world&n=1");
        assert_eq!(map["msg"], "hello world");
        assert_eq!(map["n"], "1");
    }

    #[test]
    fn keeps_literal_plus() {
        let map = decode("expr=1+1");
        assert_eq!(map["expr"], "1+1");
    }

    #[test]
    fn later_keys_win() {
        let map = decode("k=1&k=2");
        assert_eq!(map["k"], "2");
    }

    #[test]
    fn bare_key_has_empty_value() {
        let map = decode("flag&x=1");
        assert_eq!(map["flag"], "");
        assert_eq!(map.len(), 2);
    }
}
