// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

/// Fallback when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type inferred from the extension of the last path segment.
#[must_use]
pub fn for_path(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path() {
        assert_eq!(for_path("site/index.html"), "text/html");
        assert_eq!(for_path("a/b/DATA.JSON"), "application/json");
        assert_eq!(for_path("img/logo.png"), "image/png");
        assert_eq!(for_path("noext"), DEFAULT_CONTENT_TYPE);
        assert_eq!(for_path(".hidden"), DEFAULT_CONTENT_TYPE);
        assert_eq!(for_path("dir.d/file"), DEFAULT_CONTENT_TYPE);
        assert_eq!(for_path("blob.unknownext"), DEFAULT_CONTENT_TYPE);
    }
}
