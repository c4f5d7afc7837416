//! Browser header sets sent with every request

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

/// Desktop browser agents requests rotate through
pub const USER_AGENTS: [&str; 10] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/118.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/119.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/119.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

const DEFAULT_LANGUAGE: &str = "en-US,en;q=0.5";

const LANGUAGE_VARIANTS: [&str; 4] = [
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-US,en;q=0.8,fr;q=0.5",
    "en;q=0.7",
];

/// Picks an agent uniformly from the pool
pub fn random_agent<R: Rng>(rng: &mut R) -> &'static str {
    USER_AGENTS.choose(rng).copied().unwrap_or(USER_AGENTS[0])
}

/// Builds the header set for one request
///
/// With probability `variation` the optional headers are perturbed: a different
/// Accept-Language, DNT sometimes dropped, and Cache-Control switched to `no-cache`.
/// Accept-Encoding is left to the HTTP client, which negotiates what it can decode.
pub fn browser_headers<R: Rng>(rng: &mut R, agent: &'static str, variation: f64) -> HeaderMap {
    let vary = rng.gen_bool(variation.clamp(0.0, 1.0));

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    let language = if vary {
        LANGUAGE_VARIANTS
            .choose(rng)
            .copied()
            .unwrap_or(DEFAULT_LANGUAGE)
    } else {
        DEFAULT_LANGUAGE
    };
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(language));

    if !vary || rng.gen_bool(0.5) {
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    }

    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );

    let cache = if vary && rng.gen_bool(0.5) {
        "no-cache"
    } else {
        "max-age=0"
    };
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(cache));

    headers
}
