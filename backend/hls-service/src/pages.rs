//! HTML pages: upload form, player and link list

use actix_web::HttpResponse;
use htmlescape::{encode_attribute, encode_minimal};

use crate::models::VideoUploadRecord;

const UPLOAD_FORM: &str = include_str!("../web/templates/upload.html");
const HLS_JS: &str = "https://cdn.jsdelivr.net/npm/hls.js@1";

/// GET /
pub async fn home() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(UPLOAD_FORM)
}

/// One `<a>` per record, separated by `<br>`
pub fn video_links(videos: &[VideoUploadRecord], playlist_name: &str) -> String {
    videos
        .iter()
        .map(|video| {
            format!(
                "<a href='{}'>{}</a><br>",
                encode_attribute(&video.playlist_url(playlist_name)),
                encode_minimal(&video.filename)
            )
        })
        .collect()
}

pub fn video_player(videos: &[VideoUploadRecord], playlist_name: &str) -> String {
    let items: String = videos
        .iter()
        .map(|video| {
            format!(
                "<li><a href=\"#\" data-src=\"{}\">{}</a> <small>{}</small></li>\n",
                encode_attribute(&video.playlist_url(playlist_name)),
                encode_minimal(&video.filename),
                video.upload_time.format("%Y-%m-%d %H:%M:%S UTC")
            )
        })
        .collect();

    let first = videos
        .first()
        .map(|video| encode_attribute(&video.playlist_url(playlist_name)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8">
<title>Video Player</title>
<script src="{HLS_JS}"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
video {{ width: 100%; max-width: 960px; background: #000; }}
li {{ margin: .3rem 0; }}
</style>
</head><body>
<h1>Videos</h1>
<video id="player" controls data-src="{first}"></video>
<ul id="videos">
{items}</ul>
<script>
const video = document.getElementById('player');
let hls = null;
function play(src) {{
  if (hls) {{ hls.destroy(); hls = null; }}
  if (window.Hls && Hls.isSupported()) {{
    hls = new Hls();
    hls.loadSource(src);
    hls.attachMedia(video);
  }} else if (video.canPlayType('application/vnd.apple.mpegurl')) {{
    video.src = src;
  }}
}}
document.querySelectorAll('#videos a').forEach(a => a.addEventListener('click', e => {{
  e.preventDefault();
  play(a.dataset.src);
}}));
play(video.dataset.src);
</script>
</body></html>
"#
    )
}
