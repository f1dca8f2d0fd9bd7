use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::ParticipantChoices;

/// A capture/publish resolution with its encoding limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPreset {
    pub width: u32,
    pub height: u32,
    pub max_bitrate: u32,
    pub max_framerate: u32,
}

impl VideoPreset {
    const fn new(width: u32, height: u32, max_bitrate: u32, max_framerate: u32) -> Self {
        Self {
            width,
            height,
            max_bitrate,
            max_framerate,
        }
    }

    pub const H216: Self = Self::new(384, 216, 180_000, 15);
    pub const H540: Self = Self::new(960, 540, 800_000, 25);
    pub const H720: Self = Self::new(1280, 720, 1_700_000, 30);
    pub const H1080: Self = Self::new(1920, 1080, 3_000_000, 30);
    pub const H2160: Self = Self::new(3840, 2160, 8_000_000, 30);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    Vp8,
    H264,
    #[default]
    Vp9,
    Av1,
    H265,
}

impl VideoCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::Vp8 => "vp8",
            VideoCodec::H264 => "h264",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Av1 => "av1",
            VideoCodec::H265 => "h265",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown video codec: {0}")]
pub struct UnknownCodec(pub String);

impl FromStr for VideoCodec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vp8" => Ok(VideoCodec::Vp8),
            "h264" => Ok(VideoCodec::H264),
            "vp9" => Ok(VideoCodec::Vp9),
            "av1" => Ok(VideoCodec::Av1),
            "h265" => Ok(VideoCodec::H265),
            other => Err(UnknownCodec(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    /// Empty means the system default device.
    pub video_device_id: String,
    pub audio_device_id: String,
    pub resolution: VideoPreset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishConstraints {
    /// Higher layer first.
    pub simulcast_layers: [VideoPreset; 2],
    /// Redundant audio encoding.
    pub red: bool,
    pub dtx: bool,
    pub video_codec: VideoCodec,
}

/// Everything the media session needs to know before connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfiguration {
    pub capture: CaptureConstraints,
    pub publish: PublishConstraints,
    pub adaptive_stream: bool,
    pub dynacast: bool,
}

/// Per-room quality options chosen by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RoomOptions {
    #[serde(default)]
    pub hq: bool,
    #[serde(default)]
    pub codec: Option<VideoCodec>,
}

/// Builds [`SessionConfiguration`]s, falling back to a configured codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfigBuilder {
    default_codec: VideoCodec,
}

impl SessionConfigBuilder {
    pub fn new(default_codec: VideoCodec) -> Self {
        Self { default_codec }
    }

    /// Uses `DEFAULT_CODEC` from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_codec)
    }

    pub fn build(&self, choices: &ParticipantChoices, options: RoomOptions) -> SessionConfiguration {
        let (resolution, simulcast_layers) = if options.hq {
            (VideoPreset::H2160, [VideoPreset::H1080, VideoPreset::H720])
        } else {
            (VideoPreset::H720, [VideoPreset::H540, VideoPreset::H216])
        };

        SessionConfiguration {
            capture: CaptureConstraints {
                video_device_id: choices.video_device().to_string(),
                audio_device_id: choices.audio_device().to_string(),
                resolution,
            },
            publish: PublishConstraints {
                simulcast_layers,
                red: true,
                dtx: false,
                video_codec: options.codec.unwrap_or(self.default_codec),
            },
            adaptive_stream: true,
            dynacast: true,
        }
    }
}
