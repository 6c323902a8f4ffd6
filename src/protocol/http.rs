use axum::http::{header, HeaderMap, HeaderValue};

pub trait HeaderMapExt {
    fn get_str<N>(&self, name: N) -> Option<&str>
    where
        N: header::AsHeaderName;

    fn get_str_or_empty<N>(&self, name: N) -> &str
    where
        N: header::AsHeaderName;

    fn get_bytes_or_empty<N>(&self, name: N) -> &[u8]
    where
        N: header::AsHeaderName;

    fn get_value_or_empty<N>(&self, name: N) -> HeaderValue
    where
        N: header::AsHeaderName;
}

impl HeaderMapExt for HeaderMap {
    fn get_str<N>(&self, name: N) -> Option<&str>
    where
        N: header::AsHeaderName,
    {
        self.get(name).and_then(|value| value.to_str().ok())
    }

    /// Missing headers and values that are not visible ASCII both read as "".
    fn get_str_or_empty<N>(&self, name: N) -> &str
    where
        N: header::AsHeaderName,
    {
        self.get_str(name).unwrap_or_default()
    }

    fn get_bytes_or_empty<N>(&self, name: N) -> &[u8]
    where
        N: header::AsHeaderName,
    {
        self.get(name).map(HeaderValue::as_bytes).unwrap_or_default()
    }

    fn get_value_or_empty<N>(&self, name: N) -> HeaderValue
    where
        N: header::AsHeaderName,
    {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_reads_empty() {
        let headers = HeaderMap::new();
        assert_eq!(headers.get_str("x-forwarded-for"), None);
        assert_eq!(headers.get_str_or_empty("x-forwarded-for"), "");
        assert!(headers.get_bytes_or_empty("x-forwarded-for").is_empty());
        assert_eq!(headers.get_value_or_empty("cf-connecting-ip"), "");
    }

    #[test]
    fn first_value_wins_for_repeated_header() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(headers.get_str_or_empty("x-forwarded-for"), "10.0.0.1");
    }

    #[test]
    fn opaque_bytes_read_empty_but_value_is_kept() {
        let mut headers = HeaderMap::new();
        let opaque = HeaderValue::from_bytes(b"\xfa10.0.0.1").unwrap();
        headers.insert("cf-connecting-ip", opaque.clone());
        assert_eq!(headers.get_str_or_empty("cf-connecting-ip"), "");
        assert_eq!(headers.get_bytes_or_empty("cf-connecting-ip"), b"\xfa10.0.0.1");
        assert_eq!(headers.get_value_or_empty("cf-connecting-ip"), opaque);
    }
}
