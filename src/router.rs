//! Versioned deep link router for ethx
//!
//! Supports ethx://v1/* URLs that open an address search at a given page.
//!
//! ## Supported Routes (v1)
//!
//! - `ethx://v1/address/<addr>` - newest page of the address
//! - `ethx://v1/address/<addr>?p=first` - oldest page
//! - `ethx://v1/address/<addr>?p=last` - newest page
//! - `ethx://v1/address/<addr>?p=next&h=<hash>` - page after the one ending with `<hash>`
//! - `ethx://v1/address/<addr>?p=prev&h=<hash>` - page before the one starting with `<hash>`
//! - `ethx://v1/address/<addr>?p=at&h=<hash>[&dir=back]` - page anchored at `<hash>`
//! - `ethx://v1/home`
//!
//! The scheme is case-insensitive, single/multiple slash variants are
//! accepted, and `#/v1/...` or `/v1/...` work as path-only forms. Query
//! values are percent-decoded.

use crate::session::PageRequest;

/// Split off the query (without `?`) and drop any fragment
#[inline]
fn split_query_frag(s: &str) -> (&str, &str) {
    let s = match s.find('#') {
        // A leading '#' is the web hash form, not a fragment
        Some(i) if i > 0 => &s[..i],
        _ => s,
    };
    match s.find('?') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

/// Extract path after ethx:// scheme (case-insensitive, handles variants)
#[inline]
fn after_ethx_scheme(raw: &str) -> Option<&str> {
    let s = raw.trim();
    if let Some(pos) = s.find("://") {
        if s[..pos].eq_ignore_ascii_case("ethx") {
            return Some(s[pos + 3..].trim_start_matches('/'));
        }
    } else if s.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("ethx:")) {
        return Some(s[5..].trim_start_matches('/'));
    }
    None
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// V1 route variants
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteV1 {
    /// Address transaction search: `ethx://v1/address/<addr>?p=...`
    Address {
        address: String,
        request: PageRequest,
    },
    /// Home: `ethx://v1/home`
    Home,
}

/// Versioned route container
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Version 1 routes
    V1(RouteV1),
}

/// Parse a route from a deep link or path.
///
/// Returns `None` for invalid URLs, unsupported versions, and page requests
/// missing their anchor hash.
pub fn parse(raw: &str) -> Option<Route> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(Route::V1(RouteV1::Home));
    }

    let rest = if let Some(rest) = after_ethx_scheme(s) {
        rest
    } else if let Some(rest) = s.strip_prefix("#/") {
        rest
    } else if let Some(rest) = s.strip_prefix('/') {
        rest
    } else {
        s
    };

    let (path, query) = split_query_frag(rest);
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let version = segments.next()?.to_ascii_lowercase();
    if version != "v1" {
        return None;
    }

    let page = segments.next().unwrap_or("").to_ascii_lowercase();
    match page.as_str() {
        "" | "home" => Some(Route::V1(RouteV1::Home)),
        "address" => {
            let address = segments.next()?.to_string();
            let request = parse_page_request(query)?;
            Some(Route::V1(RouteV1::Address { address, request }))
        }
        _ => None,
    }
}

/// `p`/`h`/`dir` query parameters → [`PageRequest`]; newest page by default.
pub fn parse_page_request(query: &str) -> Option<PageRequest> {
    let p = query_param(query, "p").map(|p| p.to_ascii_lowercase());
    let anchor = query_param(query, "h");
    match (p.as_deref(), anchor) {
        (None, _) | (Some("last"), _) => Some(PageRequest::Last),
        (Some("first"), _) => Some(PageRequest::First),
        (Some("next"), Some(anchor)) => Some(PageRequest::Next { anchor }),
        (Some("prev"), Some(anchor)) => Some(PageRequest::Previous { anchor }),
        (Some("at"), Some(anchor)) => {
            let seek_forward = !query_param(query, "dir")
                .is_some_and(|dir| dir.eq_ignore_ascii_case("back"));
            Some(PageRequest::Around {
                anchor,
                seek_forward,
            })
        }
        _ => None,
    }
}

/// Deep link that reopens `request` for `address`.
pub fn address_link(address: &str, request: &PageRequest) -> String {
    let base = format!("ethx://v1/address/{address}");
    match request {
        PageRequest::Last => base,
        PageRequest::First => format!("{base}?p=first"),
        PageRequest::Next { anchor } => {
            format!("{base}?p=next&h={}", urlencoding::encode(anchor))
        }
        PageRequest::Previous { anchor } => {
            format!("{base}?p=prev&h={}", urlencoding::encode(anchor))
        }
        PageRequest::Around {
            anchor,
            seek_forward,
        } => {
            let dir = if *seek_forward { "" } else { "&dir=back" };
            format!("{base}?p=at&h={}{dir}", urlencoding::encode(anchor))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x00000000219ab540356cBB839Cbe05303d7705Fa";

    fn address_route(raw: &str) -> (String, PageRequest) {
        match parse(raw) {
            Some(Route::V1(RouteV1::Address { address, request })) => (address, request),
            other => panic!("Expected Address route, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_address_defaults_to_newest() {
        let (address, request) = address_route(&format!("ethx://v1/address/{ADDR}"));
        assert_eq!(address, ADDR);
        assert_eq!(request, PageRequest::Last);

        let (_, request) = address_route(&format!("#/v1/address/{ADDR}"));
        assert_eq!(request, PageRequest::Last);

        let (_, request) = address_route(&format!("/v1/address/{ADDR}?p=first"));
        assert_eq!(request, PageRequest::First);
    }

    #[test]
    fn test_parse_navigation() {
        let (_, request) = address_route(&format!("ethx://v1/address/{ADDR}?p=next&h=0xabc"));
        assert_eq!(
            request,
            PageRequest::Next {
                anchor: "0xabc".to_string()
            }
        );

        let (_, request) = address_route(&format!("ethx://v1/address/{ADDR}?h=0xdef&p=PREV"));
        assert_eq!(
            request,
            PageRequest::Previous {
                anchor: "0xdef".to_string()
            }
        );

        let (_, request) =
            address_route(&format!("ethx://v1/address/{ADDR}?p=at&h=0x1&dir=back#frag"));
        assert_eq!(
            request,
            PageRequest::Around {
                anchor: "0x1".to_string(),
                seek_forward: false
            }
        );
    }

    #[test]
    fn test_parse_home() {
        assert_eq!(parse("ethx://v1/home").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("ethx://v1/").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("ethx://v1").unwrap(), Route::V1(RouteV1::Home));
        assert_eq!(parse("").unwrap(), Route::V1(RouteV1::Home));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("ethx://v2/address/0x1").is_none()); // Wrong version
        assert!(parse("ethx://v1/address/").is_none()); // Missing address
        assert!(parse("ethx://v1/address/0x1?p=next").is_none()); // Missing anchor
        assert!(parse("ethx://v1/address/0x1?p=sideways&h=0x2").is_none());
        assert!(parse("ethx://v1/block/12").is_none()); // Unknown route
    }

    #[test]
    fn test_parse_scheme_variants() {
        let (address, _) = address_route(&format!("ETHX://v1/address/{ADDR}"));
        assert_eq!(address, ADDR);
        let (address, _) = address_route(&format!("ethx:/v1/address/{ADDR}"));
        assert_eq!(address, ADDR);
        let (address, _) = address_route(&format!("ethx:////v1/address/{ADDR}"));
        assert_eq!(address, ADDR);
    }

    #[test]
    fn test_link_roundtrip_decodes_query() {
        let request = PageRequest::Around {
            anchor: "0xab cd".to_string(),
            seek_forward: false,
        };
        let link = address_link(ADDR, &request);
        assert!(link.contains("0xab%20cd"));
        assert_eq!(address_route(&link), (ADDR.to_string(), request));
    }
}
