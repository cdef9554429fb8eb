use url::Url;
use crate::errors::DaichoError::AuthError;
use crate::errors::DaichoResult;

pub(crate) fn extract_protocol_hostname(url: &str) -> DaichoResult<(String, String)> {
    let parsed_url = Url::parse(url)
        .map_err(|e| AuthError(format!("URL parse failed: {:?}", e)))?;
    let protocol = parsed_url.scheme().to_string();
    Ok((protocol, parsed_url.host_str().unwrap_or("").to_string()))
}

/// Split a redirect uri into its base (scheme + host) and port, defaulting
/// the port from the scheme when the uri carries none.
pub(crate) fn parse_redirect_uri(uri: &str) -> DaichoResult<(String, u16)> {
    let parsed_url = Url::parse(uri)
        .map_err(|e| AuthError(format!("URL parse failed: {:?}", e)))?;
    let port = parsed_url.port_or_known_default()
        .ok_or_else(|| AuthError(format!("Redirect uri has no resolvable port: {}", uri)))?;
    let base = format!("{}://{}", parsed_url.scheme(), parsed_url.host_str().unwrap_or(""));

    Ok((base, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_protocol_hostname() {
        let (protocol, hostname) = extract_protocol_hostname("http://localhost:8080/auth").unwrap();
        assert_eq!(protocol, "http");
        assert_eq!(hostname, "localhost");
    }

    #[test]
    fn test_parse_redirect_uri_with_port() {
        let (base, port) = parse_redirect_uri("http://localhost:8080/").unwrap();
        assert_eq!(base, "http://localhost");
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_redirect_uri_default_port() {
        let (base, port) = parse_redirect_uri("https://example.com/callback").unwrap();
        assert_eq!(base, "https://example.com");
        assert_eq!(port, 443);
    }

    #[test]
    fn test_parse_redirect_uri_invalid() {
        assert!(parse_redirect_uri("not a uri").is_err());
    }
}
