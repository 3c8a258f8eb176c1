use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::FilenameMetadataExtractor;

use super::dated_underscore_convention::DatedUnderscoreConvention;
use super::stereo_mix_convention::StereoMixConvention;

/// Naming convention of an ingestion batch; selects the extractor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    StereoMix,
    DatedUnderscore,
}

impl TryFrom<String> for NamingConvention {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "stereo_mix" | "stereo-mix" => Ok(Self::StereoMix),
            "dated_underscore" | "dated-underscore" => Ok(Self::DatedUnderscore),
            other => Err(format!(
                "Invalid naming convention: {}. Expected: stereo_mix or dated_underscore",
                other
            )),
        }
    }
}

pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn create(convention: NamingConvention) -> Arc<dyn FilenameMetadataExtractor> {
        match convention {
            NamingConvention::StereoMix => Arc::new(StereoMixConvention),
            NamingConvention::DatedUnderscore => Arc::new(DatedUnderscoreConvention),
        }
    }
}
