// Audio module - recording decoding and the sample type shared by the pipeline

pub mod decoder;
mod sample;

pub use decoder::{decode_file, decode_wav, NOMINAL_SAMPLE_RATE};
pub use sample::AudioSample;
