mod ffmpeg_converter;
mod ffprobe_probe;

pub use ffmpeg_converter::FfmpegConverter;
pub use ffprobe_probe::FfprobeDurationProbe;
