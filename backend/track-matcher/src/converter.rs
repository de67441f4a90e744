//! Whole-playlist conversion on top of [`SearchCoordinator`]

use crate::candidate::CandidateSource;
use crate::coordinator::{MatchOutcome, MatchResult, SearchCoordinator};
use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// A track as listed on the origin platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<SourceTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    Converted,
    LowConfidence,
    NotFound,
    Rejected,
    /// Blank track name, never searched
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertedTrack {
    pub original: SourceTrack,
    pub status: TrackStatus,
    pub matched: Option<MatchResult>,
    /// Percent of the playlist processed once this track was done
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub name: String,
    pub tracks: Vec<ConvertedTrack>,
    pub total_tracks: usize,
    /// Converted plus low-confidence matches
    pub converted_tracks: usize,
    /// `converted_tracks / total_tracks`, in `[0, 1]`
    pub success_rate: f64,
}

pub struct PlaylistConverter<'a, S> {
    coordinator: &'a SearchCoordinator<S>,
}

impl<'a, S: CandidateSource> PlaylistConverter<'a, S> {
    pub fn new(coordinator: &'a SearchCoordinator<S>) -> Self {
        Self { coordinator }
    }

    /// Match every track of `playlist` in order.
    ///
    /// Individual search failures are reported per track; only an empty
    /// playlist is an error.
    pub async fn convert(
        &self,
        playlist: &Playlist,
        blacklisted_urls: &HashSet<String>,
    ) -> Result<ConversionReport, MatchError> {
        if playlist.tracks.is_empty() {
            return Err(MatchError::InvalidInput("No tracks to convert".into()));
        }

        let total = playlist.tracks.len();
        info!(playlist = %playlist.name, total, "Starting playlist conversion");

        let mut tracks = Vec::with_capacity(total);
        let mut converted = 0;

        for (idx, track) in playlist.tracks.iter().enumerate() {
            let progress = (idx + 1) as f64 / total as f64 * 100.0;

            if track.name.trim().is_empty() {
                warn!(position = idx + 1, "Skipping track with blank name");
                tracks.push(ConvertedTrack {
                    original: track.clone(),
                    status: TrackStatus::Skipped,
                    matched: None,
                    progress,
                });
                continue;
            }

            let artists = track.artists.join(", ");
            let artist = Some(artists.as_str()).filter(|a| !a.trim().is_empty());
            let report = self
                .coordinator
                .find_best_match(&track.name, artist, blacklisted_urls)
                .await;

            let (status, matched) = match report.outcome {
                MatchOutcome::Matched(result) if result.low_confidence => {
                    (TrackStatus::LowConfidence, Some(result))
                }
                MatchOutcome::Matched(result) => (TrackStatus::Converted, Some(result)),
                MatchOutcome::NotFound => (TrackStatus::NotFound, None),
                MatchOutcome::Rejected => (TrackStatus::Rejected, None),
            };
            if matched.is_some() {
                converted += 1;
            }

            info!(
                track = %track.name,
                status = ?status,
                progress = format!("{:.1}%", progress),
                "Processed track"
            );
            tracks.push(ConvertedTrack {
                original: track.clone(),
                status,
                matched,
                progress,
            });

            if report.needs_reset {
                if let Err(e) = self.coordinator.reset_source().await {
                    warn!(error = %e, "Source reset failed, continuing with current session");
                }
            }
        }

        let success_rate = converted as f64 / total as f64;
        info!(
            playlist = %playlist.name,
            converted,
            total,
            success_rate = format!("{:.1}%", success_rate * 100.0),
            "Playlist conversion finished"
        );

        Ok(ConversionReport {
            name: playlist.name.clone(),
            tracks,
            total_tracks: total,
            converted_tracks: converted,
            success_rate,
        })
    }
}
