use crate::{CoreError, Emotion};

/// Spotify playlist recommended for each mood.
pub fn playlist_for(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Joy => "https://open.spotify.com/playlist/37i9dQZF1DXdPec7aLTmlC",
        Emotion::Sadness => "https://open.spotify.com/playlist/37i9dQZF1DX7qK8ma5wgG1",
        Emotion::Anger => "https://open.spotify.com/playlist/37i9dQZF1DWY3PJWG3ogmJ",
        Emotion::Fear => "https://open.spotify.com/playlist/37i9dQZF1DX4sWSpwq3LiO",
        Emotion::Love => "https://open.spotify.com/playlist/37i9dQZF1DWVY4eLfA3XFQ",
        Emotion::Disgust => "https://open.spotify.com/playlist/37i9dQZF1DX6taq20FeuKj",
        Emotion::Neutral => "https://open.spotify.com/playlist/37i9dQZF1DX4WYpdgoIcn6",
    }
}

/// Looks up the playlist for a raw label string.
pub fn resolve(label: &str) -> Result<&'static str, CoreError> {
    let emotion: Emotion = label.parse()?;
    Ok(playlist_for(emotion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_label_resolves() {
        let mut seen = HashSet::new();
        for emotion in Emotion::ALL {
            let url = resolve(emotion.as_str()).unwrap();
            assert!(url.starts_with("https://open.spotify.com/playlist/"));
            assert!(seen.insert(url), "duplicate playlist for {}", emotion);
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!(matches!(
            resolve("surprise"),
            Err(CoreError::UnknownEmotion { .. })
        ));
        assert!(resolve("").is_err());
    }
}
