pub mod prototype;
pub mod quantization;
