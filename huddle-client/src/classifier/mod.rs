mod stream_classifier;

pub use stream_classifier::*;
