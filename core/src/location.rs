//! Query-parameter extraction from DHIS2 location hashes.
//!
//! The DHIS2 client-side router encodes query parameters after the hash,
//! as `#/route?key=value`, rather than in the standard search string. The
//! hosting page passes its current location in explicitly, keeping this a
//! pure function.

use url::form_urlencoded;

/// Return the value bound to `name` in the query segment of `location`'s
/// hash, or `None` when the hash, the `?` segment or the name is absent.
///
/// Only the segment between the first `?` in the hash and the next `?`
/// (if any) is consulted. Values are percent-decoded.
pub fn extract_query_param(location: &str, name: &str) -> Option<String> {
    let (_, fragment) = location.split_once('#')?;
    let (_, rest) = fragment.split_once('?')?;
    let query = match rest.split_once('?') {
        Some((first, _)) => first,
        None => rest,
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
