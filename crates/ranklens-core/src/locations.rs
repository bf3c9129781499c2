//! Region to provider-location mapping.
//!
//! Websites store a free-form region code; providers want a numeric
//! location code plus a language. One table serves every dimension so the
//! same website always queries the same market.

/// Provider location parameters for one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub code: u32,
    pub language: &'static str,
}

/// The fallback market for websites with no region or an unknown one.
pub const DEFAULT_LOCATION: Location = Location {
    code: 2840,
    language: "en",
};

/// Map a stored region code to provider location parameters.
///
/// Matching is case-insensitive and whitespace-tolerant. Unknown regions
/// fall back to [`DEFAULT_LOCATION`] instead of failing the request.
pub fn lookup(region: Option<&str>) -> Location {
    let Some(region) = region else {
        return DEFAULT_LOCATION;
    };
    let (code, language) = match region.trim().to_ascii_lowercase().as_str() {
        "us" => (2840, "en"),
        "uk" | "gb" => (2826, "en"),
        "de" => (2276, "de"),
        "fr" => (2250, "fr"),
        "es" => (2724, "es"),
        "it" => (2380, "it"),
        "ca" => (2124, "en"),
        "au" => (2036, "en"),
        "nl" => (2528, "nl"),
        "br" => (2076, "pt"),
        "in" => (2356, "en"),
        "jp" => (2392, "ja"),
        _ => return DEFAULT_LOCATION,
    };
    Location { code, language }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions() {
        assert_eq!(lookup(Some("us")).code, 2840);
        assert_eq!(lookup(Some("de")).code, 2276);
        assert_eq!(lookup(Some("de")).language, "de");
        assert_eq!(lookup(Some("br")).language, "pt");
        assert_eq!(lookup(Some("jp")).language, "ja");
        assert_eq!(lookup(Some("uk")).code, lookup(Some("gb")).code);
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_tolerant() {
        assert_eq!(lookup(Some("DE")).code, 2276);
        assert_eq!(lookup(Some(" fr ")).code, 2250);
    }

    #[test]
    fn test_unknown_or_missing_region_falls_back_to_us() {
        assert_eq!(lookup(None), DEFAULT_LOCATION);
        assert_eq!(lookup(Some("")), DEFAULT_LOCATION);
        assert_eq!(lookup(Some("atlantis")), DEFAULT_LOCATION);
    }
}
