use rust_embed::RustEmbed;

/// Static files bundled into the binary.
#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct Asset;
