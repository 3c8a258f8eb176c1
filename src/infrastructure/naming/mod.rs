mod date_prefix;
mod dated_underscore_convention;
mod extractor_factory;
mod stereo_mix_convention;

pub use dated_underscore_convention::DatedUnderscoreConvention;
pub use extractor_factory::{ExtractorFactory, NamingConvention};
pub use stereo_mix_convention::StereoMixConvention;
