//! Platform recognition and embed-URL construction.

use crate::MediaKind;
use url::{Url, form_urlencoded};

/// How a link should be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Embeddable resource with its player URL.
    Embed { kind: MediaKind, embed_url: String },
    /// Anything else, including platform URLs without a usable resource id.
    Generic,
}

/// Classify a URL by platform and resource id.
pub fn classify_url(raw: &str) -> LinkTarget {
    let Ok(url) = Url::parse(raw.trim()) else {
        return LinkTarget::Generic;
    };
    let Some(kind) = platform_for_parsed(&url) else {
        return LinkTarget::Generic;
    };
    let embed_url = match kind {
        MediaKind::Youtube => youtube_embed(&url),
        MediaKind::Tiktok => tiktok_embed(&url),
        MediaKind::Spotify => spotify_embed(&url),
        MediaKind::Soundcloud => soundcloud_embed(&url),
        MediaKind::Dailymotion => dailymotion_embed(&url),
        MediaKind::GoogleMaps => google_maps_embed(&url),
    };
    match embed_url {
        Some(embed_url) => LinkTarget::Embed { kind, embed_url },
        None => LinkTarget::Generic,
    }
}

/// Platform a URL belongs to by host, regardless of path shape.
pub(crate) fn platform_for_url(raw: &str) -> Option<MediaKind> {
    Url::parse(raw.trim())
        .ok()
        .and_then(|url| platform_for_parsed(&url))
}

fn platform_for_parsed(url: &Url) -> Option<MediaKind> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(host.as_str());
    let first_segment = segments(url).into_iter().next().unwrap_or_default();
    match host {
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtu.be" => {
            Some(MediaKind::Youtube)
        }
        "tiktok.com" | "m.tiktok.com" | "vm.tiktok.com" | "vt.tiktok.com" => {
            Some(MediaKind::Tiktok)
        }
        "open.spotify.com" => Some(MediaKind::Spotify),
        "soundcloud.com" | "m.soundcloud.com" => Some(MediaKind::Soundcloud),
        "dailymotion.com" | "dai.ly" => Some(MediaKind::Dailymotion),
        "maps.app.goo.gl" => Some(MediaKind::GoogleMaps),
        "goo.gl" if first_segment == "maps" => Some(MediaKind::GoogleMaps),
        _ if host.starts_with("maps.google.") => Some(MediaKind::GoogleMaps),
        _ if host.starts_with("google.") && first_segment == "maps" => Some(MediaKind::GoogleMaps),
        _ => None,
    }
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|parts| parts.filter(|part| !part.is_empty()).collect())
        .unwrap_or_default()
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn youtube_embed(url: &Url) -> Option<String> {
    let parts = segments(url);
    if url.host_str().is_some_and(|host| host.ends_with("youtu.be")) {
        let id = parts.first().copied().filter(|id| is_token(id))?;
        return Some(format!("https://www.youtube.com/embed/{id}"));
    }
    match parts.as_slice() {
        ["watch", ..] => query_param(url, "v")
            .filter(|id| is_token(id))
            .map(|id| format!("https://www.youtube.com/embed/{id}")),
        ["playlist", ..] => query_param(url, "list")
            .filter(|id| is_token(id))
            .map(|id| format!("https://www.youtube.com/embed/videoseries?list={id}")),
        ["embed" | "shorts" | "live" | "v", id, ..] if is_token(id) => {
            Some(format!("https://www.youtube.com/embed/{id}"))
        }
        _ => None,
    }
}

fn tiktok_embed(url: &Url) -> Option<String> {
    let id = match segments(url).as_slice() {
        [user, "video", id, ..] if user.starts_with('@') => *id,
        ["embed", "v2", id, ..] | ["embed", id, ..] => *id,
        _ => return None,
    };
    id.chars()
        .all(|c| c.is_ascii_digit())
        .then(|| format!("https://www.tiktok.com/embed/v2/{id}"))
}

fn spotify_embed(url: &Url) -> Option<String> {
    let parts = segments(url);
    let mut parts = parts.as_slice();
    if let [first, rest @ ..] = parts
        && (first.starts_with("intl-") || *first == "embed")
    {
        parts = rest;
    }
    match parts {
        [kind @ ("track" | "album" | "playlist" | "episode" | "show" | "artist"), id, ..]
            if is_token(id) =>
        {
            Some(format!("https://open.spotify.com/embed/{kind}/{id}"))
        }
        _ => None,
    }
}

/// Top-level SoundCloud paths that are not artist pages.
const SOUNDCLOUD_RESERVED: &[&str] = &[
    "discover", "search", "stream", "you", "upload", "charts", "pages", "settings", "messages",
];

fn soundcloud_embed(url: &Url) -> Option<String> {
    let parts = segments(url);
    match parts.as_slice() {
        [artist, track, rest @ ..] if !SOUNDCLOUD_RESERVED.contains(artist) => {
            let mut canonical = format!("https://soundcloud.com/{artist}/{track}");
            if *track == "sets" {
                let set = rest.first()?;
                canonical.push('/');
                canonical.push_str(set);
            }
            Some(format!(
                "https://w.soundcloud.com/player/?url={}",
                encode(&canonical)
            ))
        }
        _ => None,
    }
}

fn dailymotion_embed(url: &Url) -> Option<String> {
    let parts = segments(url);
    if url.host_str().is_some_and(|host| host.ends_with("dai.ly")) {
        let id = parts.first().copied().filter(|id| is_token(id))?;
        return Some(format!("https://www.dailymotion.com/embed/video/{id}"));
    }
    match parts.as_slice() {
        ["video", slug, ..] => {
            // Legacy links append the title after an underscore.
            let id = slug.split('_').next().unwrap_or_default();
            is_alnum(id).then(|| format!("https://www.dailymotion.com/embed/video/{id}"))
        }
        ["playlist", slug, ..] => {
            let id = slug.split('_').next().unwrap_or_default();
            is_alnum(id).then(|| format!("https://www.dailymotion.com/embed/playlist/{id}"))
        }
        _ => None,
    }
}

fn is_alnum(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

fn google_maps_embed(url: &Url) -> Option<String> {
    let embed = |query: &str| format!("https://maps.google.com/maps?q={query}&output=embed");
    if let Some(query) = query_param(url, "q").or_else(|| query_param(url, "query")) {
        return Some(embed(&encode(&query)));
    }
    let parts = segments(url);
    let parts = match parts.as_slice() {
        ["maps", rest @ ..] => rest,
        rest => rest,
    };
    match parts {
        ["place" | "search", place, ..] if !place.starts_with('@') => Some(embed(*place)),
        [coords, ..] if coords.starts_with('@') => {
            let mut fields = coords.trim_start_matches('@').split(',');
            let lat = fields.next()?;
            let lng = fields.next()?;
            let valid = |v: &str| v.parse::<f64>().is_ok();
            (valid(lat) && valid(lng)).then(|| embed(&format!("{lat},{lng}")))
        }
        _ => None,
    }
}
