//! Request parameter extraction
//!
//! Flattens the query string and an urlencoded form body into a
//! [`ParamMap`]. When a name repeats, the first value wins; query
//! parameters come before body parameters.

use url::form_urlencoded;

use crate::frontcontroller::ParamMap;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

pub fn extract(query: Option<&str>, content_type: Option<&str>, body: &[u8]) -> ParamMap {
    let mut params = ParamMap::new();
    if let Some(query) = query {
        collect_into(&mut params, query.as_bytes());
    }
    if content_type.is_some_and(is_form_urlencoded) {
        collect_into(&mut params, body);
    }
    params
}

fn collect_into(params: &mut ParamMap, input: &[u8]) {
    for (name, value) in form_urlencoded::parse(input) {
        params
            .entry(name.into_owned())
            .or_insert_with(|| value.into_owned());
    }
}

fn is_form_urlencoded(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URLENCODED))
}
