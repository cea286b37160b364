use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

static REDIRECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".(http://.*?)(&.*)?$").expect("valid redirect regex"));

/// Unwraps a tracking redirect such as `/url?q=http://...&sa=X` into the
/// destination URL. Anything that does not embed an `http://` URL is
/// returned unchanged.
#[must_use]
pub fn cleanup_redirect(url: &str) -> String {
    match REDIRECT_RE.captures(url) {
        Some(caps) => percent_decode_str(&caps[1]).decode_utf8_lossy().into_owned(),
        None => url.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_plain_destination() {
        assert_eq!(
            cleanup_redirect("/url?q=http://www.imdb.com/title/tt0765010/"),
            "http://www.imdb.com/title/tt0765010/"
        );
    }

    #[test]
    fn drops_trailing_tracking_params_and_decodes() {
        let wrapped = "/url?q=http://www.fandango.com/redirect.aspx%3Ftid%3DAAPNV%26tmid%3D69454%26date%3D2009-12-23%2B10:45%26a%3D11584%26source%3Dgoogle&sa=X&oi=moviesf&ii=6";
        assert_eq!(
            cleanup_redirect(wrapped),
            "http://www.fandango.com/redirect.aspx?tid=AAPNV&tmid=69454&date=2009-12-23+10:45&a=11584&source=google"
        );
    }

    #[test]
    fn leaves_unwrapped_url_alone() {
        assert_eq!(
            cleanup_redirect("/movies?near=02139&start=10"),
            "/movies?near=02139&start=10"
        );
        assert_eq!(
            cleanup_redirect("https://tickets.example.com/buy?id=1"),
            "https://tickets.example.com/buy?id=1"
        );
    }

    #[test]
    fn direct_http_url_is_returned_verbatim() {
        assert_eq!(
            cleanup_redirect("http://www.fandango.com/"),
            "http://www.fandango.com/"
        );
    }
}
