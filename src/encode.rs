//! Writing rendered frames out: MP4 through the system `ffmpeg`, PNG through `image`.

pub mod ffmpeg;
pub mod png;
