//! Video core settings and constants
//!
//! Shared HLS output conventions for the upload service and its tests

pub mod constants;
pub mod models;

pub use models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_settings_match_constants() {
        let settings = HlsSettings::default();
        assert_eq!(settings.segment_seconds, constants::HLS_SEGMENT_SECONDS);
        assert_eq!(settings.list_size, constants::HLS_LIST_SIZE);
        assert_eq!(settings.playlist_name, constants::HLS_PLAYLIST_NAME);
    }

    #[test]
    fn test_playlist_path_joins_output_dir() {
        let settings = HlsSettings::default();
        assert_eq!(
            settings.playlist_path(Path::new("/srv/videos/abc")),
            Path::new("/srv/videos/abc/playlist.m3u8")
        );
    }
}
